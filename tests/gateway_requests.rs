//! End-to-end gateway tests against a mock SMS API.
//!
//! Requests go through `SmsGatewayClient` and `HttpRpcClient` to a local
//! `wiremock` server; the form bodies the server receives are inspected.

use chrono::NaiveDate;
use dysms_gateway::{
    BizId, ClassifiedError, ExtendCode, GatewayConfig, GatewayError, GatewayOutcome,
    HttpRpcClient, OutcomeCode, PhoneNumber, SendBatchSms, SendSms, SendStatus, SignError,
    SignName, SigningContext, SmsGatewayClient, TemplateParams,
};
use serde_json::json;
use std::collections::BTreeMap;
use url::Url;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stub_signer(
    _context: &SigningContext<'_>,
    params: &mut BTreeMap<String, String>,
) -> Result<(), SignError> {
    params.insert("Signature".to_string(), "stub".to_string());
    Ok(())
}

fn gateway(server: &MockServer) -> SmsGatewayClient<HttpRpcClient> {
    let config = GatewayConfig::builder("test_key_id", "test_secret")
        .endpoint(Url::parse(&server.uri()).unwrap())
        .build();
    let rpc = HttpRpcClient::new(&config, stub_signer).unwrap();
    SmsGatewayClient::from_config(&config, rpc)
}

async fn mount_ok(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Form parameters of the only request the server received.
async fn sent_form(server: &MockServer) -> BTreeMap<String, String> {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    serde_urlencoded::from_bytes(&requests[0].body).unwrap()
}

fn phone(raw: &str) -> PhoneNumber {
    PhoneNumber::new(raw).unwrap()
}

fn ok_send_body() -> serde_json::Value {
    json!({ "Code": "OK", "Message": "OK", "RequestId": "req-1", "BizId": "900619746936498440^0" })
}

#[tokio::test]
async fn send_sms_without_optionals_omits_keys() {
    let server = MockServer::start().await;
    mount_ok(&server, ok_send_body()).await;

    let outcome = GatewayOutcome::from(
        gateway(&server)
            .send_sms(SendSms::new(phone("13800138000"), "Aliyun", "SMS_1"))
            .await,
    );
    assert_eq!(outcome.code, OutcomeCode::Success);

    let form = sent_form(&server).await;
    assert_eq!(form["Action"], "SendSms");
    assert_eq!(form["RegionId"], "cn-hangzhou");
    assert_eq!(form["PhoneNumbers"], "13800138000");
    assert_eq!(form["Signature"], "stub");
    for key in ["TemplateParam", "OutId", "SmsUpExtendCode"] {
        assert!(!form.contains_key(key), "{key} should be omitted");
    }
}

#[tokio::test]
async fn send_sms_with_optionals_encodes_them() {
    let server = MockServer::start().await;
    mount_ok(&server, ok_send_body()).await;

    let response = gateway(&server)
        .send_sms(
            SendSms::new(phone("13800138000"), "Aliyun", "SMS_1")
                .template_params(TemplateParams::new().with("code", "1234").with("product", "dysms"))
                .out_id("order-1")
                .extend_code("90999"),
        )
        .await
        .unwrap();
    assert_eq!(response.biz_id, Some(BizId::from("900619746936498440^0")));

    let form = sent_form(&server).await;
    assert_eq!(form["TemplateParam"], r#"{"code":"1234","product":"dysms"}"#);
    assert_eq!(form["OutId"], "order-1");
    assert_eq!(form["SmsUpExtendCode"], "90999");
}

#[tokio::test]
async fn send_batch_sms_encodes_non_empty_lists() {
    let server = MockServer::start().await;
    mount_ok(&server, ok_send_body()).await;

    gateway(&server)
        .send_batch_sms(
            SendBatchSms::new(
                vec![phone("13800138000"), phone("13900139000")],
                vec![SignName::from("Aliyun"), SignName::from("Aliyun")],
                "SMS_2",
                vec![
                    TemplateParams::new().with("name", "Tom"),
                    TemplateParams::new().with("name", "Jack"),
                ],
            )
            .extend_codes(vec![ExtendCode::from("90997"), ExtendCode::from("90998")]),
        )
        .await
        .unwrap();

    let form = sent_form(&server).await;
    assert_eq!(form["Action"], "SendBatchSms");
    assert_eq!(form["PhoneNumberJson"], r#"["13800138000","13900139000"]"#);
    assert_eq!(form["SignNameJson"], r#"["Aliyun","Aliyun"]"#);
    assert_eq!(
        form["TemplateParamJson"],
        r#"[{"name":"Tom"},{"name":"Jack"}]"#
    );
    assert_eq!(form["SmsUpExtendCodeJson"], r#"["90997","90998"]"#);
}

#[tokio::test]
async fn send_batch_sms_omits_empty_lists() {
    let server = MockServer::start().await;
    mount_ok(&server, ok_send_body()).await;

    gateway(&server)
        .send_batch_sms(SendBatchSms::new(Vec::new(), Vec::new(), "SMS_2", Vec::new()))
        .await
        .unwrap();

    let form = sent_form(&server).await;
    assert_eq!(form["TemplateCode"], "SMS_2");
    for key in [
        "PhoneNumberJson",
        "SignNameJson",
        "TemplateParamJson",
        "SmsUpExtendCodeJson",
    ] {
        assert!(!form.contains_key(key), "{key} should be omitted");
    }
}

#[tokio::test]
async fn business_failure_yields_failure_outcome() {
    let server = MockServer::start().await;
    mount_ok(
        &server,
        json!({
            "Code": "isv.BUSINESS_LIMIT_CONTROL",
            "Message": "触发分钟级流控Permits:1",
            "RequestId": "req-2"
        }),
    )
    .await;

    let result = gateway(&server)
        .send_sms(SendSms::new(phone("13800138000"), "Aliyun", "SMS_1"))
        .await;

    match &result {
        Err(GatewayError::Api { code, request_id, .. }) => {
            assert_eq!(code, "isv.BUSINESS_LIMIT_CONTROL");
            assert_eq!(request_id.as_deref(), Some("req-2"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    let outcome = GatewayOutcome::from(result);
    assert_eq!(outcome.code.as_i8(), -1);
    assert!(outcome.data.is_none());
}

#[tokio::test]
async fn http_error_is_server_side() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "Code": "SignatureDoesNotMatch",
            "Message": "Specified signature is not matched with our calculation.",
            "RequestId": "req-3"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .send_sms(SendSms::new(phone("13800138000"), "Aliyun", "SMS_1"))
        .await
        .unwrap_err();

    assert!(err.is_server_side());
    assert!(!err.is_not_found());
    assert_eq!(err.code(), Some("SignatureDoesNotMatch"));
    assert_eq!(err.request_id(), Some("req-3"));
}

#[tokio::test]
async fn unreachable_endpoint_is_client_side() {
    let config = GatewayConfig::builder("test_key_id", "test_secret")
        .endpoint(Url::parse("http://127.0.0.1:1/").unwrap())
        .build();
    let gateway = SmsGatewayClient::from_config(
        &config,
        HttpRpcClient::new(&config, stub_signer).unwrap(),
    );

    let outcome = GatewayOutcome::from(
        gateway
            .send_sms(SendSms::new(phone("13800138000"), "Aliyun", "SMS_1"))
            .await,
    );
    assert_eq!(outcome.code, OutcomeCode::Failure);
}

#[tokio::test]
async fn query_send_details_decodes_records() {
    let server = MockServer::start().await;
    mount_ok(
        &server,
        json!({
            "Code": "OK",
            "Message": "OK",
            "RequestId": "req-4",
            "TotalCount": 1,
            "SmsSendDetailDTOs": {
                "SmsSendDetailDTO": [{
                    "PhoneNum": "15298356881",
                    "SendStatus": 3,
                    "ErrCode": "DELIVERED",
                    "TemplateCode": "SMS_1",
                    "Content": "【阿里云】验证码为：1234",
                    "SendDate": "2019-01-08 16:44:10",
                    "ReceiveDate": "2019-01-08 16:44:13",
                    "OutId": "123"
                }]
            }
        }),
    )
    .await;

    let date = NaiveDate::from_ymd_opt(2019, 1, 8).unwrap();
    let biz_id = BizId::from("134523^4351232");
    let response = gateway(&server)
        .query_send_details(&phone("15298356881"), date, Some(&biz_id))
        .await
        .unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.details.len(), 1);
    assert_eq!(response.details[0].send_status, SendStatus::Delivered);

    let form = sent_form(&server).await;
    assert_eq!(form["Action"], "QuerySendDetails");
    assert_eq!(form["SendDate"], "20190108");
    assert_eq!(form["PageSize"], "10");
    assert_eq!(form["CurrentPage"], "1");
    assert_eq!(form["BizId"], "134523^4351232");
}
