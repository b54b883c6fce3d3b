use env_flags::env_flags;

env_flags! {
    /// Storage key id; used when `[storage].key_id` is not set in config.toml.
    pub HUDDLE_STORAGE_KEY_ID: Option<&str> = None;

    /// Storage application key; used when `[storage].application_key` is not set.
    pub HUDDLE_STORAGE_APPLICATION_KEY: Option<&str> = None;
}
