/// Display version information
pub fn execute() {
    println!("porteiro {}", env!("CARGO_PKG_VERSION"));
    println!("Telegram profile gate bot");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        // Version command should not panic
        execute();
    }
}
