//! End-to-end ensure-create against a mocked CSP and VMC.

use std::time::Duration;

use vmc_sddc::config::ConfigParser;
use vmc_sddc::vmc::{
    CreateOutcome, CspAuthenticator, LifecycleOrchestrator, LifecycleState, PollPolicy, VmcClient,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SDDCS: &str = "/vmc/api/orgs/org-1/sddcs";

const CONFIG: &str = r"
vmc:
  refresh_token: rt-123
  org_id: org-1
  user_name: alice@example.com
sddc:
  name: lab
  num_hosts: 3
  region: US_WEST_2
  subnet_id: subnet-0a1b
  connected_account_id: acct-9
  vxlan_subnet: 10.2.0.0/16
";

#[tokio::test]
async fn test_ensure_create_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/csp/gateway/am/api/auth/api-tokens/authorize"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "tok" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Initial lookup sees nothing; the listing catches up after the create.
    Mock::given(method("GET"))
        .and(path(SDDCS))
        .and(header("csp-auth-token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SDDCS))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "s-0", "user_name": "bob@example.com", "sddc_state": "READY" },
            { "id": "s-7", "user_name": "alice@example.com", "sddc_state": "INITIALIZATION" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SDDCS))
        .and(body_partial_json(serde_json::json!({
            "name": "lab",
            "num_hosts": 3,
            "provider": "AWS",
            "region": "US_WEST_2",
            "deployment_type": "SingleAZ",
            "vxlan_subnet": "10.2.0.0/16",
            "account_link_sddc_config": [{
                "customer_subnet_ids": ["subnet-0a1b"],
                "connected_account_id": "acct-9"
            }]
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({ "id": "task-1" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{SDDCS}/s-7")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "s-7",
            "name": "lab",
            "sddc_state": "READY",
            "created": "2024-05-01T12:30:00Z",
            "resource_config": {
                "clusters": [{ "cluster_name": "Cluster-1", "cluster_id": "c-1" }],
                "deployment_type": "SingleAZ",
                "region": "US_WEST_2",
                "esx_hosts": [{}, {}, {}]
            }
        })))
        .mount(&server)
        .await;

    let mut config = ConfigParser::new()
        .parse_yaml(CONFIG, None)
        .expect("config parses");
    config.vmc.api_url = server.uri();
    config.vmc.csp_url = server.uri();

    let token = CspAuthenticator::new(&config.vmc.csp_url)
        .expect("authenticator builds")
        .authenticate(&config.vmc.refresh_token)
        .await
        .expect("token exchange succeeds");
    let client =
        VmcClient::new(&config.vmc.api_url, &config.vmc.org_id, token).expect("client builds");

    let policy = PollPolicy {
        initial_interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(20),
        multiplier: 2.0,
        timeout: Duration::from_secs(5),
    };
    let outcome = LifecycleOrchestrator::new(client, config.vmc.user_name.clone())
        .with_poll_policy(policy)
        .ensure_created(&config.sddc)
        .await
        .expect("ensure-create succeeds");

    let CreateOutcome::Created(descriptor) = outcome else {
        panic!("expected a freshly created SDDC, got {outcome:?}");
    };

    assert_eq!(descriptor.id, "s-7");
    assert_eq!(descriptor.name, "lab");
    assert_eq!(descriptor.state, LifecycleState::Ready);
    assert_eq!(descriptor.cluster_name, "Cluster-1");
    assert_eq!(descriptor.host_count, 3);
    assert_eq!(descriptor.deployment_type, "SingleAZ");
    assert_eq!(descriptor.region, "US_WEST_2");
    assert!(descriptor.created.is_some());
}
