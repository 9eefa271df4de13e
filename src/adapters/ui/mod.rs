pub mod banner;
pub mod progress;
pub mod prompt;

/// Prints the welcome banner. Call once at startup after tracing init.
pub fn init_ui() {
    banner::print_welcome();
}
