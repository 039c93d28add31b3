//! Sending an SMS and looking up its delivery record.
//!
//! The request signer is the integration point for your signature
//! implementation; the placeholder below sends requests unsigned, which the
//! provider rejects.
//!
//! # Running
//!
//! ```bash
//! ALIYUN_ACCESS_KEY_ID=... ALIYUN_ACCESS_KEY_SECRET=... \
//!     cargo run --example send_sms -- 13800138000 Aliyun SMS_123456789
//! ```

use chrono::Local;
use dysms_gateway::{
    GatewayConfig, GatewayOutcome, HttpRpcClient, PhoneNumber, SendSms, SignError,
    SigningContext, SmsGatewayClient, TemplateParams,
};
use std::collections::BTreeMap;
use std::env;

fn placeholder_signer(
    _context: &SigningContext<'_>,
    _params: &mut BTreeMap<String, String>,
) -> Result<(), SignError> {
    // Add `Signature` and its companion fields here
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut args = env::args().skip(1);
    let phone = PhoneNumber::new(args.next().unwrap_or_else(|| "13800138000".to_string()))?;
    let sign_name = args.next().unwrap_or_else(|| "Aliyun".to_string());
    let template_code = args.next().unwrap_or_else(|| "SMS_123456789".to_string());

    // Reads ALIYUN_ACCESS_KEY_ID, ALIYUN_ACCESS_KEY_SECRET and optional ALIYUN_REGION_ID
    let config = GatewayConfig::from_env()?;
    let rpc = HttpRpcClient::new(&config, placeholder_signer)?;
    let gateway = SmsGatewayClient::from_config(&config, rpc);

    println!("Sending SMS to {phone} via region {}...", gateway.region_id());
    let request = SendSms::new(phone.clone(), sign_name, template_code)
        .template_params(TemplateParams::new().with("code", "1234"))
        .out_id("demo-1");

    let result = gateway.send_sms(request).await;
    let biz_id = result.as_ref().ok().and_then(|r| r.biz_id.clone());

    let outcome = GatewayOutcome::from(result);
    println!("Outcome: code={} message={}", outcome.code.as_i8(), outcome.message);
    if let Some(data) = &outcome.data {
        println!("  data: {data}");
    }

    let Some(biz_id) = biz_id else {
        return Ok(());
    };

    println!("\nQuerying today's send records for {phone}...");
    match gateway
        .query_send_details(&phone, Local::now().date_naive(), Some(&biz_id))
        .await
    {
        Ok(details) => {
            println!("Total records: {}", details.total_count);
            for detail in details.details {
                println!(
                    "  {} status={:?} err={:?}",
                    detail.phone_num, detail.send_status, detail.err_code
                );
            }
        }
        Err(e) => println!("Query failed: {e}"),
    }

    Ok(())
}
