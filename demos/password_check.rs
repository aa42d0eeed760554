use approx_sketch::{check_uniqueness, SketchConfig, UniquenessStatus};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut filter = SketchConfig::default()
        .filter()
        .expect("default filter parameters are valid");

    for password in ["password123", "admin123", "qwerty123"] {
        filter.add(password);
    }

    let candidates = ["password123", "newpassword", "admin123", "guest"];
    let report = check_uniqueness(&mut filter, candidates.map(Some), true);

    for (password, status) in report.iter() {
        match status {
            UniquenessStatus::Invalid => println!("Password '{}' is invalid.", password),
            UniquenessStatus::AlreadyUsed => println!("Password '{}' is already used.", password),
            UniquenessStatus::Unique => println!("Password '{}' is unique.", password),
        }
    }
}
