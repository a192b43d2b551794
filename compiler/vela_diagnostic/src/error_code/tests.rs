use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E3001.to_string(), "E3001");
    assert_eq!(ErrorCode::E9002.as_str(), "E9002");
}

#[test]
fn all_codes_round_trip() {
    for code in ErrorCode::ALL {
        let parsed: ErrorCode = code.as_str().parse().unwrap_or(ErrorCode::E9001);
        assert_eq!(parsed, *code);
    }
}

#[test]
fn parse_is_case_insensitive() {
    assert_eq!("e3002".parse::<ErrorCode>(), Ok(ErrorCode::E3002));
    assert_eq!("E1234".parse::<ErrorCode>(), Err(()));
}

#[test]
fn every_code_belongs_to_one_range() {
    for code in ErrorCode::ALL {
        let ranges = [
            code.is_dispatch_error(),
            code.is_codegen_error(),
            code.is_internal_error(),
        ];
        assert_eq!(ranges.iter().filter(|r| **r).count(), 1, "{code}");
    }
}

#[test]
fn summaries_are_not_empty() {
    for code in ErrorCode::ALL {
        assert!(!code.summary().is_empty());
    }
}
