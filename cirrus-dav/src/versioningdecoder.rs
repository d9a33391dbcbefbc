use super::error::ParsingError;
use super::tree::Element;

// RFC3253 3.1.5 DAV:supported-report-set
//
// This property identifies the reports that are supported by the
// resource.
//
// <!ELEMENT supported-report-set (supported-report*)>
// <!ELEMENT supported-report report>
// <!ELEMENT report ANY>
// ANY value: a report element type

/// Names of the reports supported by the resource, eg. `sync-collection`
/// or `calendar-multiget`. Empty when the answer is unusable.
pub fn parse_supported_report_set(src: &str) -> Vec<String> {
    try_parse_supported_report_set(src).unwrap_or_else(|err| {
        tracing::debug!(err=%err, "unusable supported-report-set, assuming no report");
        vec![]
    })
}

pub fn try_parse_supported_report_set(src: &str) -> Result<Vec<String>, ParsingError> {
    let doc = Element::parse(src)?;
    let set = doc
        .find_first("supported-report-set")
        .ok_or(ParsingError::TagNotFound("supported-report-set"))?;

    Ok(set
        .elements()
        .filter(|e| e.name == "supported-report")
        .filter_map(|sr| sr.child("report"))
        .filter_map(Element::first_child_name)
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_reports() {
        let src = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/bob/</D:href>
    <D:propstat>
      <D:prop>
        <D:supported-report-set>
          <D:supported-report><D:report><D:sync-collection/></D:report></D:supported-report>
          <D:supported-report><D:report><C:calendar-multiget/></D:report></D:supported-report>
          <D:supported-report><D:report/></D:supported-report>
          <D:supported-report><D:report><C:calendar-query/></D:report></D:supported-report>
        </D:supported-report-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

        assert_eq!(
            parse_supported_report_set(src),
            vec![
                "sync-collection".to_string(),
                "calendar-multiget".to_string(),
                "calendar-query".to_string(),
            ]
        );
    }

    #[test]
    fn supported_reports_fail_soft() {
        assert!(parse_supported_report_set("<D:supported-report-set xmlns:D=\"DAV:\">").is_empty());
        assert!(parse_supported_report_set("{\"json\": true}").is_empty());
        assert!(parse_supported_report_set("<supported-report-set/>").is_empty());
        assert!(try_parse_supported_report_set("<prop/>").is_err());
    }
}
