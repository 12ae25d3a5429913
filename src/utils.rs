/// Returns the server name (hostname) of this machine, if determinable.
pub fn server_name() -> Option<String> {
    hostname::get().ok().and_then(|name| name.into_string().ok())
}

/// Serializes an optional timestamp as float seconds since the unix epoch.
pub mod ts_seconds_float {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde::ser::Error;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        st: &Option<SystemTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match st {
            Some(st) => {
                let duration = st
                    .duration_since(UNIX_EPOCH)
                    .map_err(|_| S::Error::custom("timestamp before the unix epoch"))?;
                serializer.serialize_f64(duration.as_secs_f64())
            }
            None => serializer.serialize_none(),
        }
    }
}
