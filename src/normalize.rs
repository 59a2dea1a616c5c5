use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RawMember;

const HOUSE: &str = "House";
const SENATE: &str = "Senate";
const AT_LARGE: &str = "At-Large";

/// Flat view of a member. Field order is the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMember {
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub district: String,
    pub party: String,
    pub chamber: String,
}

pub fn normalize_members(members: &[RawMember]) -> Vec<NormalizedMember> {
    members.iter().map(normalize_member).collect()
}

pub fn normalize_member(member: &RawMember) -> NormalizedMember {
    let name = member.get("name").and_then(Value::as_str).unwrap_or("");
    let (first_name, last_name) = split_name(name);
    let chamber = chamber_of(member.get("terms"));
    let district = district_of(member.get("district"), chamber);

    NormalizedMember {
        first_name,
        last_name,
        state: text_of(member.get("state")),
        district,
        party: text_of(member.get("partyName")),
        chamber: chamber.to_string(),
    }
}

/// Splits `"Last, First Middle"` or `"First Middle Last"` into `(first, last)`.
pub fn split_name(name: &str) -> (String, String) {
    if let Some((last, rest)) = name.split_once(',') {
        let first = rest.split_whitespace().next().unwrap_or("");
        return (first.to_string(), last.trim().to_string());
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    let first = tokens.first().copied().unwrap_or("");
    let last = match tokens.as_slice() {
        [_, .., last] => *last,
        _ => "",
    };
    (first.to_string(), last.to_string())
}

/// Chamber of the most recent term. The API nests terms as `{"item": [...]}`,
/// a bare list or a single object are accepted as well.
pub fn chamber_of(terms: Option<&Value>) -> &'static str {
    let Some(mut terms) = terms else {
        return "";
    };
    if let Some(items) = terms.get("item") {
        terms = items;
    }
    let latest = match terms {
        Value::Array(items) => match items.last() {
            Some(item) => item,
            None => return "",
        },
        other => other,
    };

    let chamber = latest.get("chamber").and_then(Value::as_str).unwrap_or("");
    if chamber.contains(HOUSE) {
        HOUSE
    } else if chamber.contains(SENATE) {
        SENATE
    } else {
        ""
    }
}

/// Missing, `null` and `""` count as no district. `0` is a real district and stays `"0"`.
pub fn district_of(district: Option<&Value>, chamber: &str) -> String {
    match district {
        None | Some(Value::Null) => absent_district(chamber),
        Some(Value::String(s)) if s.is_empty() => absent_district(chamber),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn absent_district(chamber: &str) -> String {
    if chamber == SENATE {
        AT_LARGE.to_string()
    } else {
        String::new()
    }
}

#[inline]
fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawMember {
        match value {
            Value::Object(map) => map,
            _ => panic!("test member must be an object"),
        }
    }

    #[test]
    fn splits_names() {
        assert_eq!(split_name("Smith, John Q."), ("John".into(), "Smith".into()));
        assert_eq!(split_name("John Smith"), ("John".into(), "Smith".into()));
        assert_eq!(split_name("Madonna"), ("Madonna".into(), "".into()));
        assert_eq!(split_name("  Van Hollen ,  Chris  "), ("Chris".into(), "Van Hollen".into()));
        assert_eq!(split_name("John Q. Public"), ("John".into(), "Public".into()));
        assert_eq!(split_name("Cher,"), ("".into(), "Cher".into()));
        assert_eq!(split_name(""), ("".into(), "".into()));
    }

    #[test]
    fn derives_chamber_from_latest_term() {
        let house = json!({"chamber": "House of Representatives"});
        let senate = json!({"chamber": "Senate"});
        assert_eq!(chamber_of(Some(&house)), "House");
        assert_eq!(chamber_of(Some(&senate)), "Senate");
        assert_eq!(chamber_of(Some(&json!({"chamber": "Assembly"}))), "");
        assert_eq!(chamber_of(Some(&json!({}))), "");
        assert_eq!(chamber_of(None), "");

        let moved_up = json!({"item": [
            {"chamber": "House of Representatives", "startYear": 2013},
            {"chamber": "Senate", "startYear": 2019}
        ]});
        assert_eq!(chamber_of(Some(&moved_up)), "Senate");
        assert_eq!(chamber_of(Some(&json!([house, senate]))), "Senate");
        assert_eq!(chamber_of(Some(&json!({"item": []}))), "");
    }

    #[test]
    fn defaults_district_by_chamber() {
        assert_eq!(district_of(None, "Senate"), "At-Large");
        assert_eq!(district_of(None, "House"), "");
        assert_eq!(district_of(Some(&Value::Null), "Senate"), "At-Large");
        assert_eq!(district_of(Some(&json!("")), "House"), "");
        assert_eq!(district_of(Some(&json!(12)), "House"), "12");
        assert_eq!(district_of(Some(&json!(0)), "House"), "0");
        assert_eq!(district_of(Some(&json!("7")), "House"), "7");
    }

    #[test]
    fn normalizes_an_api_member() {
        let member = raw(json!({
            "bioguideId": "S000033",
            "name": "Sanders, Bernard",
            "partyName": "Independent",
            "state": "Vermont",
            "terms": {"item": [
                {"chamber": "House of Representatives", "startYear": 1991, "endYear": 2007},
                {"chamber": "Senate", "startYear": 2007}
            ]}
        }));

        assert_eq!(
            normalize_member(&member),
            NormalizedMember {
                first_name: "Bernard".into(),
                last_name: "Sanders".into(),
                state: "Vermont".into(),
                district: "At-Large".into(),
                party: "Independent".into(),
                chamber: "Senate".into(),
            }
        );
    }

    #[test]
    fn missing_fields_become_empty() {
        let member = raw(json!({"name": "Madonna", "district": 3}));
        let normalized = normalize_member(&member);
        assert_eq!(normalized.first_name, "Madonna");
        assert_eq!(normalized.last_name, "");
        assert_eq!(normalized.state, "");
        assert_eq!(normalized.party, "");
        assert_eq!(normalized.chamber, "");
        assert_eq!(normalized.district, "3");
    }
}
