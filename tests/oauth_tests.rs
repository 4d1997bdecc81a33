// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use spendbook::oauth::{
    LoginReq, challenge_for, extract_code, generate_challenge_verifier, login_url,
};

#[test]
fn challenge_matches_known_s256_vector() {
    assert_eq!(
        challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
        "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
    );
}

#[test]
fn generated_verifier_is_url_safe_and_paired() {
    let a = generate_challenge_verifier(32);
    let b = generate_challenge_verifier(32);
    assert_eq!(a.code_verifier.len(), 43);
    assert!(
        a.code_verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );
    assert_eq!(a.code_challenge, challenge_for(&a.code_verifier));
    assert_ne!(a.code_verifier, b.code_verifier);
}

#[test]
fn verifier_bytes_have_no_fixed_bits() {
    let high_nibbles: std::collections::HashSet<u8> = (0..64)
        .map(|_| {
            let v = generate_challenge_verifier(16);
            let bytes = URL_SAFE_NO_PAD.decode(v.code_verifier).unwrap();
            assert_eq!(bytes.len(), 16);
            bytes[6] >> 4
        })
        .collect();
    assert!(high_nibbles.len() > 1);
}

#[test]
fn login_url_encodes_parameters() {
    let req = LoginReq {
        client_id: "abc".into(),
        redirect: "https://app.example.com/cb".into(),
        code_challenge: "xyz".into(),
    };
    let url = login_url("https://auth.example.com/", &req).unwrap();
    assert_eq!(
        url,
        "https://auth.example.com/login?clientId=abc&codeChallenge=xyz&redirect=https%3A%2F%2Fapp.example.com%2Fcb"
    );
    assert!(login_url("not a url", &req).is_err());
}

#[test]
fn code_is_taken_from_redirect_or_used_verbatim() {
    assert_eq!(
        extract_code("https://app.example.com/cb?authorizationCode=XYZ&state=1").as_deref(),
        Some("XYZ")
    );
    assert_eq!(extract_code("  XYZ ").as_deref(), Some("XYZ"));
    assert_eq!(extract_code("https://app.example.com/cb?other=1"), None);
    assert_eq!(extract_code(""), None);
}
