use crate::Config;

pub mod aqicn;
pub mod ebird;
pub mod openaq;

/// Upstream data services credentials are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Aqicn,
    Ebird,
    Openaq,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Aqicn => "aqicn",
            ProviderId::Ebird => "ebird",
            ProviderId::Openaq => "openaq",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Aqicn, ProviderId::Ebird, ProviderId::Openaq]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "aqicn" => Ok(ProviderId::Aqicn),
            "ebird" => Ok(ProviderId::Ebird),
            "openaq" => Ok(ProviderId::Openaq),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: aqicn, ebird, openaq."
            )),
        }
    }
}

/// API key for `id`, with a configuration hint when it is missing.
pub(crate) fn require_api_key(config: &Config, id: ProviderId) -> anyhow::Result<String> {
    config
        .provider_api_key(id)
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for provider '{id}'.\n\
                 Hint: run `ecomonitor configure {id}` and enter your API key."
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_parse_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("AQICN").unwrap(), ProviderId::Aqicn);
        assert_eq!(ProviderId::try_from("eBird").unwrap(), ProviderId::Ebird);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn require_api_key_errors_when_missing() {
        let cfg = Config::default();
        let err = require_api_key(&cfg, ProviderId::Aqicn).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
        assert!(err.to_string().contains("Hint: run `ecomonitor configure"));
    }

    #[test]
    fn require_api_key_returns_configured_key() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Ebird, "KEY".to_string());

        let key = require_api_key(&cfg, ProviderId::Ebird).expect("key must exist");
        assert_eq!(key, "KEY");
    }
}
