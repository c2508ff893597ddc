//! Locating the SDDC owned by the configured user.

use tracing::{debug, info, warn};

use crate::error::Result;

use super::client::VmcClient;
use super::types::SddcSummary;

/// Finds SDDCs by owner name.
#[derive(Debug, Clone)]
pub struct SddcLocator {
    /// VMC API client.
    client: VmcClient,
}

impl SddcLocator {
    /// Creates a new locator.
    #[must_use]
    pub const fn new(client: VmcClient) -> Self {
        Self { client }
    }

    /// Returns the ID of the first SDDC owned by `owner`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the list call fails.
    pub async fn find_sddc_id(&self, owner: &str) -> Result<Option<String>> {
        debug!("Looking up SDDC owned by {owner} in org {}", self.client.org_id());

        let sddcs = self.client.list_sddcs().await?;
        let found = find_owned(&sddcs, owner).map(|s| s.id.clone());

        match &found {
            Some(id) => info!("Found SDDC {id} owned by {owner}"),
            None => info!("No SDDC owned by {owner}"),
        }

        Ok(found)
    }
}

/// Returns the first SDDC in list order whose owner is `owner`.
///
/// When several SDDCs share the owner the first one wins; the rest are
/// reported in a warning rather than silently dropped.
#[must_use]
pub fn find_owned<'a>(sddcs: &'a [SddcSummary], owner: &str) -> Option<&'a SddcSummary> {
    let mut matches = sddcs
        .iter()
        .filter(|s| s.user_name.as_deref() == Some(owner));

    let first = matches.next()?;
    let others: Vec<&str> = matches.map(|s| s.id.as_str()).collect();
    if !others.is_empty() {
        warn!(
            "{} SDDCs are owned by {owner}; using {} and ignoring {}",
            others.len() + 1,
            first.id,
            others.join(", ")
        );
    }

    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vmc::SessionToken;
    use crate::vmc::types::LifecycleState;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary(id: &str, owner: Option<&str>) -> SddcSummary {
        SddcSummary {
            id: id.to_string(),
            user_name: owner.map(String::from),
            name: None,
            sddc_state: LifecycleState::Ready,
        }
    }

    #[test]
    fn test_first_match_wins() {
        let sddcs = [
            summary("s-1", Some("bob")),
            summary("s-2", Some("alice")),
            summary("s-3", Some("alice")),
        ];

        let found = find_owned(&sddcs, "alice").map(|s| s.id.as_str());
        assert_eq!(found, Some("s-2"));
    }

    #[test]
    fn test_no_match() {
        assert!(find_owned(&[], "alice").is_none());

        let sddcs = [summary("s-1", Some("bob")), summary("s-2", None)];
        assert!(find_owned(&sddcs, "alice").is_none());
    }

    #[test]
    fn test_owner_match_is_exact() {
        let sddcs = [summary("s-1", Some("Alice")), summary("s-2", Some("alice "))];
        assert!(find_owned(&sddcs, "alice").is_none());
    }

    #[tokio::test]
    async fn test_find_sddc_id_against_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vmc/api/orgs/org-1/sddcs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "s-1", "user_name": "bob", "sddc_state": null },
                { "id": "s-2", "user_name": "alice", "sddc_state": "READY" }
            ])))
            .mount(&server)
            .await;

        let client =
            VmcClient::new(&server.uri(), "org-1", SessionToken::new("tok")).expect("client builds");
        let locator = SddcLocator::new(client);

        assert_eq!(
            locator.find_sddc_id("alice").await.expect("lookup succeeds").as_deref(),
            Some("s-2")
        );
        assert_eq!(locator.find_sddc_id("carol").await.expect("lookup succeeds"), None);
    }
}
