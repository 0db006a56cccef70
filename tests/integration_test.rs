use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::Server;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const GET_STATUS_ENVELOPE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap12:Envelope xmlns:soap12="http://www.w3.org/2003/05/soap-envelope">
  <soap12:Body>
    <GetStatus xmlns="http://sherpa.sherpaan.nl/">
      <securityCode>secret</securityCode>
    </GetStatus>
  </soap12:Body>
</soap12:Envelope>"#;

const GET_STATUS_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
  <soap:Body>
    <GetStatusResponse xmlns="http://sherpa.sherpaan.nl/">
      <Result>
        <Status>Online</Status>
        <Version>7.1</Version>
      </Result>
    </GetStatusResponse>
  </soap:Body>
</soap:Envelope>"#;

fn envelope_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn sherpa_soap() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("sherpa-soap"));
    cmd.env_remove("SHERPA_BASE_URL").env_remove("SHERPA_TIMEOUT");
    cmd
}

#[test]
fn test_end_to_end_call() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/Sherpa.asmx")
        .match_header("soapaction", "\"http://sherpa.sherpaan.nl/GetStatus\"")
        .match_header("content-type", "application/soap+xml; charset=utf-8")
        .match_body(GET_STATUS_ENVELOPE)
        .with_status(200)
        .with_header("content-type", "application/soap+xml; charset=utf-8")
        .with_body(GET_STATUS_RESPONSE)
        .create();

    let envelope = envelope_file(GET_STATUS_ENVELOPE);

    sherpa_soap()
        .arg("call")
        .arg("GetStatus")
        .arg("--envelope")
        .arg(envelope.path())
        .arg("--base-url")
        .arg(format!("{}?wsdl", url))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Status": "Online""#))
        .stdout(predicate::str::contains(r#""Version": "7.1""#));

    mock.assert();
}

#[test]
fn test_envelope_from_stdin_and_env_base_url() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/Sherpa.asmx")
        .match_header("soapaction", "\"http://sherpa.sherpaan.nl/GetStatus\"")
        .with_status(200)
        .with_body(GET_STATUS_RESPONSE)
        .create();

    sherpa_soap()
        .env("SHERPA_BASE_URL", &url)
        .arg("call")
        .arg("GetStatus")
        .write_stdin(GET_STATUS_ENVELOPE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Online"));

    mock.assert();
}

#[test]
fn test_unrecognized_response_prints_raw() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("POST", "/Sherpa.asmx")
        .with_status(200)
        .with_body("<html><body>Maintenance</body></html>")
        .create();

    let envelope = envelope_file(GET_STATUS_ENVELOPE);

    sherpa_soap()
        .arg("call")
        .arg("GetStatus")
        .arg("-e")
        .arg(envelope.path())
        .arg("--base-url")
        .arg(&url)
        .assert()
        .success()
        .stdout(predicate::str::contains("raw_response"))
        .stdout(predicate::str::contains("Maintenance"));
}

#[test]
fn test_http_error_fails_after_retries() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/Sherpa.asmx")
        .with_status(500)
        .with_body(GET_STATUS_RESPONSE)
        .expect(2)
        .create();

    let envelope = envelope_file(GET_STATUS_ENVELOPE);

    sherpa_soap()
        .arg("call")
        .arg("GetStatus")
        .arg("-e")
        .arg(envelope.path())
        .arg("--base-url")
        .arg(&url)
        .arg("--attempts")
        .arg("2")
        .arg("--no-backoff")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Call to GetStatus failed"))
        .stderr(predicate::str::contains("500"));

    mock.assert();
}

#[test]
fn test_dry_run_prints_plan() {
    sherpa_soap()
        .arg("call")
        .arg("GetStatus")
        .arg("--base-url")
        .arg("https://sherpa.example.com/Shop?wsdl")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://sherpa.example.com/Shop/Sherpa.asmx",
        ))
        .stdout(predicate::str::contains(
            r#"\"http://sherpa.sherpaan.nl/GetStatus\""#,
        ));
}

#[test]
fn test_missing_base_url_fails() {
    sherpa_soap()
        .arg("call")
        .arg("GetStatus")
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base-url"));
}

#[test]
fn test_missing_envelope_file_fails() {
    sherpa_soap()
        .arg("call")
        .arg("GetStatus")
        .arg("-e")
        .arg("/definitely/not/here.xml")
        .arg("--base-url")
        .arg("https://sherpa.example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read envelope"));
}
