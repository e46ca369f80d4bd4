pub mod duration_secs {
    //! (De)serializes [`Duration`] as a floating-point number of seconds.
    //!
    //! ```
    //! use std::time::Duration;
    //!
    //! #[derive(serde::Deserialize)]
    //! struct Limits {
    //!     #[serde(with = "serdable::duration_secs")]
    //!     timeout: Duration,
    //! }
    //!
    //! let x: Limits = serde_json::from_str(r#"{"timeout": 1.5}"#).unwrap();
    //! assert_eq!(x.timeout, Duration::from_millis(1500));
    //! ```
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|e| {
            de::Error::invalid_value(de::Unexpected::Float(secs), &e.to_string().as_str())
        })
    }
}

pub mod opt_duration_secs {
    //! Same as [`super::duration_secs`] for `Option<Duration>`; pair it with `#[serde(default)]`.
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(d: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match d {
            Some(d) => super::duration_secs::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::duration_secs")] Duration);

        Option::<Wrapper>::deserialize(deserializer).map(|x| x.map(|Wrapper(d)| d))
    }
}
