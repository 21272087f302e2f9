use rocket::{Build, Rocket};
use timetable::{Config, build_rocket};

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    match Config::load().and_then(build_rocket) {
        Ok(rocket) => rocket,
        Err(e) => {
            eprintln!("Failed to start timetable service: {e:?}");
            std::process::exit(1);
        }
    }
}
