//! Integration tests for the SUDOC client against a mock server

use casl::adapters::sudoc::SudocClient;
use casl::adapters::{RecordFetcher, SourceFetcher};
use casl::config::SudocConfig;
use casl::domain::{FetchError, Ppn};
use mockito::Server;

const DIRECTORY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sudoc service="iln2rcr">
  <query>
    <iln>15</iln>
    <result>
      <library><rcr>341722102</rcr><shortname>MONTPELLIER-BU Lettres</shortname></library>
      <library><rcr>341725201</rcr><shortname>MONTPELLIER-BU Sciences</shortname></library>
    </result>
  </query>
  <query>
    <iln>16</iln>
    <result>
      <library><rcr>300072101</rcr><shortname>NIMES-BU Vauban</shortname></library>
    </result>
  </query>
</sudoc>"#;

const RECORD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<record>
  <leader>     cam0 22        450 </leader>
  <controlfield tag="001">076254208</controlfield>
  <controlfield tag="008">Aax3</controlfield>
  <datafield tag="930" ind1=" " ind2=" ">
    <subfield code="5">341722102:551234567</subfield>
    <subfield code="c">Salle 1</subfield>
  </datafield>
  <datafield tag="930" ind1=" " ind2=" ">
    <subfield code="5">300072101:551234568</subfield>
  </datafield>
  <datafield tag="930" ind1=" " ind2=" ">
    <subfield code="5">751052105:551234569</subfield>
  </datafield>
</record>"#;

fn config(server: &Server, ignored: &[&str]) -> SudocConfig {
    SudocConfig {
        base_url: server.url(),
        iln2rcr_url: format!("{}/iln2rcr", server.url()),
        ilns: vec!["15".to_string(), "16".to_string()],
        ignored_rcrs: ignored.iter().map(|s| s.to_string()).collect(),
        multi_building_rcrs: vec![],
        timeout_seconds: 5,
    }
}

fn ppn() -> Ppn {
    Ppn::new("076254208").unwrap()
}

#[tokio::test]
async fn test_directory_and_holdings() {
    let mut server = Server::new_async().await;
    let directory = server
        .mock("GET", "/iln2rcr/15,16")
        .with_status(200)
        .with_body(DIRECTORY)
        .expect(1)
        .create_async()
        .await;
    let record = server
        .mock("GET", "/076254208.xml")
        .with_status(200)
        .with_body(RECORD)
        .expect(3)
        .create_async()
        .await;

    let client = SudocClient::new(&config(&server, &["341725201"])).await.unwrap();
    directory.assert_async().await;

    let followed = client.followed_rcrs();
    assert_eq!(followed.len(), 2);
    assert!(followed.contains("341722102"));
    assert!(followed.contains("300072101"));
    assert!(!followed.contains("341725201"));

    let all = client.get_locations(&ppn()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].holder_code, "341722102");
    assert_eq!(all[0].region_code, "15");
    assert_eq!(all[0].display_name, "MONTPELLIER-BU Lettres");
    assert_eq!(all[0].sub_location, "Salle 1");
    assert_eq!(all[1].region_code, "16");
    // Holders outside the directory keep empty details
    assert_eq!(all[2].holder_code, "751052105");
    assert_eq!(all[2].region_code, "");

    let scoped = client
        .get_filtered_locations(&ppn(), followed)
        .await
        .unwrap();
    let codes: Vec<&str> = scoped.iter().map(|l| l.holder_code.as_str()).collect();
    assert_eq!(codes, vec!["341722102", "300072101"]);

    let raw = client.fetch_record(&ppn()).await.unwrap();
    assert!(raw.contains("Aax3"));
    record.assert_async().await;

    let counts = client.request_counts();
    assert!(counts.contains(&("records", 3)));
    assert!(counts.contains(&("iln2rcr", 1)));
    assert!(counts.contains(&("total", 4)));
}

#[tokio::test]
async fn test_unreachable_directory_fails_setup() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/iln2rcr/15,16")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    assert!(SudocClient::new(&config(&server, &[])).await.is_err());
}

#[tokio::test]
async fn test_http_errors_are_classified() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/076254208.xml")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/12345678X.xml")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;
    server
        .mock("GET", "/111111111.xml")
        .with_status(502)
        .create_async()
        .await;
    server
        .mock("GET", "/222222222.xml")
        .with_status(200)
        .with_body("<html>not marc")
        .create_async()
        .await;

    let client = SudocClient::from_directory(&config(&server, &[]), Default::default()).unwrap();

    let err = client.get_locations(&ppn()).await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));

    let err = client
        .get_locations(&Ppn::new("12345678X").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RateLimited(_)));
    assert!(err.is_retryable());

    let err = client
        .get_locations(&Ppn::new("111111111").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RemoteServerError { status: 502, .. }));

    let err = client
        .get_locations(&Ppn::new("222222222").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "decode");
}
