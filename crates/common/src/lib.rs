pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_reports_ok() {
        assert_eq!(types::Health::ok().status, "ok");
    }
}
