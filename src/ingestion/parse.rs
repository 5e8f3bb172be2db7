//! Parse functions - extract a CreditReport from a bureau XML tree
//!
//! Container nodes are required and their absence is an extraction error.
//! Leaf fields never fail; they fall back to the defaulting policy.

use crate::ingestion::defaults::{DefaultPolicy, EMPTY_DATE};
use crate::ingestion::error::IngestError;
use crate::ingestion::tree::{parse_document, XmlNode};
use crate::ingestion::types::{
    AccountStatus, AccountType, BasicDetails, CreditAccount, CreditReport, PortfolioType,
    ReportSummary,
};
use crate::ingestion::utils::{format_address, format_name, parse_amount, text_or};
use tracing::{debug, info};

/// Root element of a bureau response document
pub const PROFILE_ROOT: &str = "INProfileResponse";

const APPLICANT_PATH: &str = "Current_Application.Current_Application_Details.Current_Applicant_Details";
const SCORE_PATH: &str = "SCORE";
const HEADER_PATH: &str = "CreditProfileHeader";
const CREDIT_ACCOUNT_PATH: &str = "CAIS_Account.CAIS_Summary.Credit_Account";
const OUTSTANDING_PATH: &str = "CAIS_Account.CAIS_Summary.Total_Outstanding_Balance";
const ENQUIRIES_PATH: &str = "TotalCAPS_Summary";
const ACCOUNT_DETAILS_PATH: &str = "CAIS_Account.CAIS_Account_DETAILS";
const HOLDER_ADDRESS: &str = "CAIS_Holder_Address_Details";

/// Address sub-fields in composition order
const ADDRESS_FIELDS: [&str; 5] = [
    "First_Line_Of_Address_non_normalized",
    "Second_Line_Of_Address_non_normalized",
    "Third_Line_Of_Address_non_normalized",
    "City_non_normalized",
    "ZIP_Postal_Code_non_normalized",
];

/// Parse raw report bytes all the way to a CreditReport
pub fn parse_report(bytes: &[u8], policy: &DefaultPolicy) -> Result<CreditReport, IngestError> {
    info!("Parsing bureau report ({} bytes)", bytes.len());

    let document = parse_document(bytes)?;
    let report = extract_report(&document, policy)?;

    info!(
        "Extracted report {} with {} accounts",
        report.report_number,
        report.credit_accounts.len()
    );
    Ok(report)
}

/// Extract a CreditReport from an already parsed document tree
pub fn extract_report(document: &XmlNode, policy: &DefaultPolicy) -> Result<CreditReport, IngestError> {
    let profile = require(document, PROFILE_ROOT)?;

    let header = require(profile, HEADER_PATH)?;
    let report_number = header
        .text_at("ReportNumber")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| IngestError::missing(format!("{PROFILE_ROOT}.{HEADER_PATH}.ReportNumber")))?
        .to_string();
    let report_date = header.text_at("ReportDate").unwrap_or_default().to_string();

    let basic_details = extract_basic_details(
        require(profile, APPLICANT_PATH)?,
        require(profile, SCORE_PATH)?,
        policy,
    );

    let report_summary = extract_summary(
        require(profile, CREDIT_ACCOUNT_PATH)?,
        require(profile, OUTSTANDING_PATH)?,
        require(profile, ENQUIRIES_PATH)?,
    );

    let credit_accounts = extract_accounts(require(profile, ACCOUNT_DETAILS_PATH)?, policy);

    Ok(CreditReport {
        report_number,
        report_date,
        basic_details,
        report_summary,
        credit_accounts,
    })
}

fn require<'a>(node: &'a XmlNode, path: &str) -> Result<&'a XmlNode, IngestError> {
    node.path(path).ok_or_else(|| {
        let full = if path == PROFILE_ROOT {
            path.to_string()
        } else {
            format!("{PROFILE_ROOT}.{path}")
        };
        IngestError::missing(full)
    })
}

pub fn extract_basic_details(applicant: &XmlNode, score: &XmlNode, policy: &DefaultPolicy) -> BasicDetails {
    BasicDetails {
        name: format_name(applicant.text_at("First_Name"), applicant.text_at("Last_Name")),
        mobile_phone: text_or(applicant.text_at("MobilePhoneNumber"), &policy.mobile_phone),
        pan: text_or(applicant.text_at("Income_TAX_PAN"), &policy.pan),
        credit_score: parse_amount(score.text_at("BureauScore")),
    }
}

pub fn extract_summary(
    credit_account: &XmlNode,
    outstanding: &XmlNode,
    enquiries: &XmlNode,
) -> ReportSummary {
    ReportSummary {
        total_accounts: parse_amount(credit_account.text_at("CreditAccountTotal")),
        active_accounts: parse_amount(credit_account.text_at("CreditAccountActive")),
        closed_accounts: parse_amount(credit_account.text_at("CreditAccountClosed")),
        current_balance: parse_amount(outstanding.text_at("Outstanding_Balance_All")),
        secured_amount: parse_amount(outstanding.text_at("Outstanding_Balance_Secured")),
        unsecured_amount: parse_amount(outstanding.text_at("Outstanding_Balance_UnSecured")),
        last_7_days_enquiries: parse_amount(enquiries.text_at("TotalCAPSLast7Days")),
    }
}

/// One CreditAccount per account node, in document order
pub fn extract_accounts(details: &XmlNode, policy: &DefaultPolicy) -> Vec<CreditAccount> {
    details
        .as_list()
        .into_iter()
        .map(|account| extract_account(account, policy))
        .collect()
}

pub fn extract_account(account: &XmlNode, policy: &DefaultPolicy) -> CreditAccount {
    // Several holder addresses can be reported; the first one is used
    let address = account
        .get(HOLDER_ADDRESS)
        .and_then(|holder| holder.as_list().first().copied())
        .map(|holder| format_address(ADDRESS_FIELDS.iter().map(|field| holder.text_at(field))))
        .unwrap_or_default();

    let record = CreditAccount {
        bank: text_or(account.text_at("Subscriber_Name"), &policy.bank),
        account_number: text_or(account.text_at("Account_Number"), &policy.account_number),
        account_type: AccountType::from_code(account.text_at("Account_Type").unwrap_or_default()),
        portfolio_type: PortfolioType::from_code(account.text_at("Portfolio_Type")),
        current_balance: parse_amount(account.text_at("Current_Balance")),
        amount_overdue: parse_amount(account.text_at("Amount_Past_Due")),
        account_status: AccountStatus::from_code(
            account.text_at("Account_Status").unwrap_or_default(),
        ),
        open_date: text_or(account.text_at("Open_Date"), EMPTY_DATE),
        closed_date: text_or(account.text_at("Date_Closed"), EMPTY_DATE),
        credit_limit: parse_amount(account.text_at("Credit_Limit_Amount")),
        address,
    };

    debug!(
        "Extracted account {} at {} ({}, {})",
        record.account_number, record.bank, record.account_type, record.account_status
    );
    record
}
