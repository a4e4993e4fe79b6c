use std::env;

fn main() {
    // Default SMS recipient from the environment (optional)
    // Used as the reply destination until an inbound message supplies a sender
    if let Ok(recipient) = env::var("LOCATOR_RECIPIENT") {
        println!("cargo:rustc-env=LOCATOR_RECIPIENT={}", recipient);
        println!(
            "cargo:warning=Using LOCATOR_RECIPIENT from environment: {}",
            recipient
        );
    } else {
        println!("cargo:rustc-env=LOCATOR_RECIPIENT=");
    }

    println!("cargo:rerun-if-env-changed=LOCATOR_RECIPIENT");
}
