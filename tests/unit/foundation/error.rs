use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StrataError::invalid("x")
            .to_string()
            .contains("invalid argument:")
    );
    assert!(
        StrataError::duplicate_name("bg")
            .to_string()
            .contains("duplicate layer name: bg")
    );
    assert!(
        StrataError::not_found("bg")
            .to_string()
            .contains("layer not found: bg")
    );
    assert!(
        StrataError::contract("x")
            .to_string()
            .contains("contract violation:")
    );
    assert!(
        StrataError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        StrataError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StrataError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
