use crate::base::neterror::NetError;

#[test]
fn test_net_error_roundtrip() {
    let original = NetError::InvalidUrl;
    let code = original.as_i32();
    assert_eq!(code, -300);
    let converted = NetError::from(code);
    assert!(matches!(converted, NetError::InvalidUrl));

    // Custom cookie error
    let custom = NetError::CookiePublicSuffix;
    let custom_code = custom.as_i32();
    assert_eq!(custom_code, -904);
    let custom_converted = NetError::from(custom_code);
    assert!(matches!(custom_converted, NetError::CookiePublicSuffix));
}

#[test]
fn test_unknown_error() {
    let err = NetError::from(-9999);
    assert!(matches!(err, NetError::Unknown(-9999)));
}

#[test]
fn test_cookie_rejections_are_classified() {
    assert!(NetError::CookieBadDomain.is_cookie_rejection());
    assert!(NetError::CookieTldDomain.is_cookie_rejection());
    assert!(!NetError::InvalidUrl.is_cookie_rejection());
    assert!(!NetError::Unknown(-1).is_cookie_rejection());
}

#[test]
fn test_url_parse_error_converts() {
    let err: NetError = url::Url::parse("not a url").unwrap_err().into();
    assert_eq!(err, NetError::InvalidUrl);
}
