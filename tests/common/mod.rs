#![allow(dead_code)]

pub const SAMPLE_REPORT: &str = include_str!("../fixtures/sample_report.xml");

/// A bureau document with the given report number, applicant block and
/// account details block
pub fn report_xml(report_number: &str, applicant: &str, accounts: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<INProfileResponse>
  <CreditProfileHeader>
    <ReportDate>20240710</ReportDate>
    <ReportNumber>{report_number}</ReportNumber>
  </CreditProfileHeader>
  <Current_Application>
    <Current_Application_Details>
      <Current_Applicant_Details>{applicant}</Current_Applicant_Details>
    </Current_Application_Details>
  </Current_Application>
  <CAIS_Account>
    <CAIS_Summary>
      <Credit_Account>
        <CreditAccountTotal>1</CreditAccountTotal>
        <CreditAccountActive>1</CreditAccountActive>
        <CreditAccountClosed>0</CreditAccountClosed>
      </Credit_Account>
      <Total_Outstanding_Balance>
        <Outstanding_Balance_All>1000</Outstanding_Balance_All>
      </Total_Outstanding_Balance>
    </CAIS_Summary>
    {accounts}
  </CAIS_Account>
  <SCORE><BureauScore>700</BureauScore></SCORE>
  <TotalCAPS_Summary><TotalCAPSLast7Days>0</TotalCAPSLast7Days></TotalCAPS_Summary>
</INProfileResponse>"#
    )
}

pub fn applicant(first: &str, last: &str, mobile: Option<&str>) -> String {
    let mobile = mobile
        .map(|m| format!("<MobilePhoneNumber>{m}</MobilePhoneNumber>"))
        .unwrap_or_default();
    format!("<First_Name>{first}</First_Name><Last_Name>{last}</Last_Name>{mobile}")
}

pub fn account(bank: &str, account_type: &str, status: &str, balance: &str) -> String {
    format!(
        "<CAIS_Account_DETAILS><Subscriber_Name>{bank}</Subscriber_Name>\
         <Account_Number>ACC-{bank}</Account_Number><Account_Type>{account_type}</Account_Type>\
         <Account_Status>{status}</Account_Status><Current_Balance>{balance}</Current_Balance>\
         </CAIS_Account_DETAILS>"
    )
}
