use latchkey::settings::*;

fn main() {
    // Load settings from the default location
    let project_settings = parse_settings(None).unwrap();
    println!("Loaded settings: {:?}", project_settings);
    println!("Token types: {:?}", project_settings.token.token_types());

    // Attempt to load from an invalid path (expected to fail)
    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {:?}", is_err);

    // Environment overrides win over the file
    // $ LATCHKEY__JWT__ACCESS_EXPIRATION_MINUTES=5 cargo run --bin settings_demo
    println!(
        "Access lifetime (minutes): {}",
        project_settings.jwt.access_expiration_minutes
    );
}
