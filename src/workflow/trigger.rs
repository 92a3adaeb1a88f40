/// True when the comment body is exactly one of the configured commands.
pub fn is_command(commands: &[String], comment_body: &str) -> bool {
    commands.iter().any(|command| command == comment_body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        let commands = vec!["/snapit".to_string(), "/snapshot".to_string()];
        assert!(is_command(&commands, "/snapit"));
        assert!(is_command(&commands, "/snapshot"));
        assert!(!is_command(&commands, "/snapit please"));
        assert!(!is_command(&commands, "please /snapit"));
        assert!(!is_command(&commands, "/SNAPIT"));
        assert!(!is_command(&commands, ""));
    }
}
