use std::str::FromStr;

pub trait OverrideByEnv {
    fn override_by_env(&mut self);
}

pub fn entry_override<T: FromStr>(value: &mut T, env_key: &str) -> bool {
    if let Ok(env_val) = std::env::var(env_key) {
        if let Ok(val) = env_val.parse::<T>() {
            *value = val;
            true
        } else {
            println!("failed to parse environment variable: {env_key}");
            false
        }
    } else {
        false
    }
}

pub fn entry_override_option<T: FromStr>(value: &mut Option<T>, env_key: &str) -> bool {
    if let Ok(env_val) = std::env::var(env_key) {
        if let Ok(val) = env_val.parse::<T>() {
            *value = Some(val);
            true
        } else {
            println!("failed to parse environment variable: {env_key}");
            false
        }
    } else {
        false
    }
}
