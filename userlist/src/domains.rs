use std::convert::Infallible;
use std::str::FromStr;

/// Email domains considered internal to the enterprise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnDomains(Vec<String>);

impl OwnDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|domain| domain.as_ref().trim().trim_start_matches('@').to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        OwnDomains(domains)
    }

    /// Whether the domain part of `email` is one of the own domains.
    pub fn contains(&self, email: &str) -> bool {
        match email.rsplit_once('@') {
            Some((_, domain)) => self.0.iter().any(|own| own.eq_ignore_ascii_case(domain.trim())),
            None => false,
        }
    }
}

impl FromStr for OwnDomains {
    type Err = Infallible;

    /// Parses a comma separated list.
    fn from_str(domains: &str) -> Result<Self, Self::Err> {
        Ok(OwnDomains::new(domains.split(',')))
    }
}

#[test]
fn own_domains_test() {
    let domains: OwnDomains = "acme.io, @Acme.COM,,".parse().unwrap();
    assert_eq!(domains, OwnDomains::new(["acme.io", "acme.com"]));
    assert!(domains.contains("alice@acme.io"));
    assert!(domains.contains("bob@ACME.com"));
    assert!(!domains.contains("carol@west.acme.io"));
    assert!(!domains.contains("acme.io"));
    assert!(!domains.contains(""));
    assert!(!OwnDomains::default().contains("alice@acme.io"));
}
