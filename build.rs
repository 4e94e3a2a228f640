use std::env;
fn main() {
    dotenvy::dotenv().ok();

    let required_vars = ["DATABASE_URL"];

    for &var in &required_vars {
        if env::var(var).is_err() {
            println!(
                "cargo:warning=Required environment variable {} is not set.",
                var
            );
        }
    }
    println!("cargo:rerun-if-env-changed=DATABASE_URL");
    println!("cargo:rerun-if-changed=.env");
}
