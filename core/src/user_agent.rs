const DEFAULT_ORIGINATOR: &str = "huddle_rs";

pub fn get_huddle_user_agent(originator: Option<&str>) -> String {
    let build_version = env!("CARGO_PKG_VERSION");
    let os_info = os_info::get();
    format!(
        "{}/{build_version} ({} {}; {})",
        originator.unwrap_or(DEFAULT_ORIGINATOR),
        os_info.os_type(),
        os_info.version(),
        os_info.architecture().unwrap_or("unknown"),
    )
}

/// HTTP client shared by the upload and send interfaces.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(get_huddle_user_agent(None))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_huddle_user_agent() {
        let user_agent = get_huddle_user_agent(None);
        assert!(user_agent.starts_with("huddle_rs/"));
        assert!(get_huddle_user_agent(Some("huddle_tui")).starts_with("huddle_tui/"));
    }
}
