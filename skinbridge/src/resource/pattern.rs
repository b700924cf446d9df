/// Shape a resource URI must have for a loader to accept it
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UriPattern {
    /// The whole URI
    Exact(&'static str),
    /// A fixed prefix followed by a non-empty identity
    Prefix(&'static str),
    /// A non-empty identity between a fixed prefix and suffix
    Wrapped {
        prefix: &'static str,
        suffix: &'static str,
    },
    /// Like [`UriPattern::Prefix`], except for the listed identities
    PrefixExcept {
        prefix: &'static str,
        excluded: &'static [&'static str],
    },
}

impl UriPattern {
    pub fn matches(&self, uri: &str) -> bool {
        match *self {
            UriPattern::Exact(expected) => uri == expected,
            UriPattern::Prefix(prefix) => uri
                .strip_prefix(prefix)
                .is_some_and(|identity| !identity.is_empty()),
            UriPattern::Wrapped { prefix, suffix } => uri
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
                .is_some_and(|identity| !identity.is_empty()),
            UriPattern::PrefixExcept { prefix, excluded } => uri
                .strip_prefix(prefix)
                .is_some_and(|identity| !identity.is_empty() && !excluded.contains(&identity)),
        }
    }

    /// The identity portion of a matching URI
    pub fn identity<'a>(&self, uri: &'a str) -> Option<&'a str> {
        if !self.matches(uri) {
            return None;
        }
        match *self {
            UriPattern::Exact(_) => Some(""),
            UriPattern::Prefix(prefix) | UriPattern::PrefixExcept { prefix, .. } => {
                uri.strip_prefix(prefix)
            }
            UriPattern::Wrapped { prefix, suffix } => uri
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_requires_identity() {
        let pattern = UriPattern::Prefix("javaClientSkin:");
        assert!(pattern.matches("javaClientSkin:0123"));
        assert!(!pattern.matches("javaClientSkin:"));
        // a longer scheme sharing the prefix is not a match
        assert!(!pattern.matches("javaClientSkinEars:0123"));
        assert_eq!(pattern.identity("javaClientSkin:0123"), Some("0123"));
    }

    #[test]
    fn test_wrapped() {
        let pattern = UriPattern::Wrapped {
            prefix: "https://minecraftcapes.net/profile/",
            suffix: "/cape",
        };
        assert!(pattern.matches("https://minecraftcapes.net/profile/abc/cape"));
        assert!(!pattern.matches("https://minecraftcapes.net/profile/abc/ears"));
        assert!(!pattern.matches("https://minecraftcapes.net/profile//cape"));
        assert_eq!(
            pattern.identity("https://minecraftcapes.net/profile/abc/cape"),
            Some("abc")
        );
    }

    #[test]
    fn test_prefix_except() {
        let pattern = UriPattern::PrefixExcept {
            prefix: "gameProfile:",
            excluded: &["none"],
        };
        assert!(pattern.matches("gameProfile:069a79f444e94726a5befca90e38aaf5"));
        assert!(!pattern.matches("gameProfile:none"));
    }
}
