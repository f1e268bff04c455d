//! Large shareholding reports (大量保有報告書).

use crate::error::Result;
use crate::parser::FactMapper;
use edinet_data::DocumentSummary;
use edinet_data::xbrl::{DEI_PREFIX, FactTable};
use serde::{Deserialize, Serialize};

/// Document type code of a large shareholding report
pub const LARGE_HOLDING_CODE: &str = "350";

const LVH_PREFIX: &str = "jplvh_cor";

/// Filings under the special reporting exemption carry this in their
/// description.
const SPECIAL_EXEMPTION: &str = "特例対象株券等";

const ADDRESS_KEYWORDS: [&str; 2] = ["所在地", "住所"];

/// Cover page of a large shareholding report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeHolding {
    /// Security code of the issuer whose shares are held
    pub issuer_sec_code: Option<String>,
    /// Reason for filing a change report
    pub reason: Option<String>,
    /// Filing date as written on the cover page
    pub filing_date: Option<String>,
    /// Document title
    pub title: Option<String>,
    /// Issuer name
    pub issuer_name: Option<String>,
    /// Security code of the filer, if listed
    pub sec_code: Option<String>,
    /// Filer name
    pub filer_name: Option<String>,
}

impl LargeHolding {
    /// Returns true if the report only announces a change of address.
    pub fn is_address_change(&self) -> bool {
        self.reason
            .as_deref()
            .is_some_and(|r| ADDRESS_KEYWORDS.iter().any(|k| r.contains(k)))
    }
}

/// Reads [`LargeHolding`] cover fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargeHoldingMapper;

impl LargeHoldingMapper {
    /// Returns true if a list entry is a large shareholding report outside
    /// the special exemption.
    pub fn selects(doc: &DocumentSummary) -> bool {
        doc.doc_type_code.as_deref() == Some(LARGE_HOLDING_CODE)
            && !doc
                .doc_description
                .as_deref()
                .is_some_and(|d| d.contains(SPECIAL_EXEMPTION))
    }
}

impl FactMapper for LargeHoldingMapper {
    type Record = LargeHolding;

    fn map(&self, facts: &FactTable) -> Result<LargeHolding> {
        let lvh = |tag| facts.get_text(Some(LVH_PREFIX), tag, None);
        let dei = |tag| facts.get_text(Some(DEI_PREFIX), tag, None);
        Ok(LargeHolding {
            issuer_sec_code: lvh("SecurityCodeOfIssuer")?,
            reason: lvh("ReasonForFilingChangeReportCoverPage")?,
            filing_date: lvh("FilingDateCoverPage")?,
            title: lvh("DocumentTitleCoverPage")?,
            issuer_name: lvh("NameOfIssuer")?,
            sec_code: dei("SecurityCodeDEI")?,
            filer_name: dei("FilerNameInJapaneseDEI")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HOLDING_INSTANCE, instance_xml};
    use edinet_data::xbrl::parse_instance;
    use rstest::rstest;

    fn summary(code: &str, description: &str) -> DocumentSummary {
        serde_json::from_value(serde_json::json!({
            "seqNumber": 1,
            "docID": "S1000001",
            "docTypeCode": code,
            "docDescription": description,
        }))
        .unwrap()
    }

    #[rstest]
    #[case("350", "変更報告書", true)]
    #[case("350", "変更報告書（特例対象株券等）", false)]
    #[case("360", "訂正報告書", false)]
    fn test_selects(#[case] code: &str, #[case] description: &str, #[case] expected: bool) {
        assert_eq!(LargeHoldingMapper::selects(&summary(code, description)), expected);
    }

    #[test]
    fn test_map_cover_page() {
        let xml = instance_xml(&[
            ("jplvh_cor:SecurityCodeOfIssuer", "FilingDateInstant", "7203"),
            ("jplvh_cor:ReasonForFilingChangeReportCoverPage", "FilingDateInstant", "株券等保有割合の1%以上の減少"),
            ("jplvh_cor:NameOfIssuer", "FilingDateInstant", "トヨタ自動車株式会社"),
            ("jpdei_cor:FilerNameInJapaneseDEI", "FilingDateInstant", "大量\u{3000}保有"),
        ]);
        let name = HOLDING_INSTANCE.rsplit('/').next().unwrap();
        let facts = parse_instance(name, xml.as_bytes()).unwrap().facts;

        let holding = LargeHoldingMapper.map(&facts).unwrap();
        assert_eq!(holding.issuer_sec_code.as_deref(), Some("7203"));
        assert_eq!(holding.filer_name.as_deref(), Some("大量 保有"));
        assert_eq!(holding.sec_code, None);
        assert!(!holding.is_address_change());
    }

    #[rstest]
    #[case(Some("本店所在地の変更"), true)]
    #[case(Some("住所の変更"), true)]
    #[case(Some("保有割合の増加"), false)]
    #[case(None, false)]
    fn test_is_address_change(#[case] reason: Option<&str>, #[case] expected: bool) {
        let holding = LargeHolding {
            reason: reason.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(holding.is_address_change(), expected);
    }
}
