#![allow(dead_code)]

use std::fs;
use std::path::Path;

use pkcs8::pkcs5::pbes2;
use pkcs8::{LineEnding, PrivateKeyInfo};
use rcgen::{
    BasicConstraints, CertificateParams, DnType, IsCa, Issuer, KeyPair, KeyUsagePurpose,
};

pub const PASSPHRASE: &str = "bakery-pass";

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

/// Template with two root images, a descriptor and one localization folder.
pub fn write_bakery_template(root: &Path) {
    write_file(&root.join("a.png"), b"\x89PNG a");
    write_file(&root.join("b.png"), b"\x89PNG b");
    write_file(
        &root.join("order.json"),
        br#"{"orderIdentifier":"template","orderType":"ecommerce"}"#,
    );
    write_file(&root.join("de.lproj/logo.png"), b"\x89PNG logo-de");
    write_file(
        &root.join("de.lproj/order.strings"),
        "\"pickup\" = \"Abholung\";".as_bytes(),
    );
    write_file(&root.join("de.lproj/pastry.png"), b"\x89PNG pastry-de");
}

/// Writes `signerCert.pem`, a passphrase protected `signerKey.pem` and
/// `wwdr.pem` into `dir`.
pub fn write_credentials(dir: &Path, passphrase: &str) {
    write_credentials_with(dir, passphrase, encrypt_key);
}

/// Same as [`write_credentials`] with a custom key encryption.
pub fn write_credentials_with(
    dir: &Path,
    passphrase: &str,
    encrypt: fn(&[u8], &str) -> String,
) {
    let authority_key = KeyPair::generate().expect("authority key");
    let mut authority_params = CertificateParams::new(Vec::<String>::new()).expect("params");
    authority_params
        .distinguished_name
        .push(DnType::CommonName, "Test Worldwide Developer Relations");
    authority_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    authority_params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    let authority_cert = authority_params
        .self_signed(&authority_key)
        .expect("authority cert");

    let signer_key = KeyPair::generate().expect("signer key");
    let mut signer_params = CertificateParams::new(Vec::<String>::new()).expect("params");
    signer_params
        .distinguished_name
        .push(DnType::CommonName, "Order Type ID: order.com.example.bakery");
    signer_params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    let issuer = Issuer::new(authority_params, authority_key);
    let signer_cert = signer_params
        .signed_by(&signer_key, &issuer)
        .expect("signer cert");

    write_file(&dir.join("wwdr.pem"), authority_cert.pem().as_bytes());
    write_file(&dir.join("signerCert.pem"), signer_cert.pem().as_bytes());
    write_file(
        &dir.join("signerKey.pem"),
        encrypt(&signer_key.serialize_der(), passphrase).as_bytes(),
    );
}

/// PKCS#8 `ENCRYPTED PRIVATE KEY` PEM using PBKDF2-SHA256 and AES-256-CBC.
pub fn encrypt_key(pkcs8_der: &[u8], passphrase: &str) -> String {
    let salt = [7u8; 16];
    let iv = [9u8; 16];
    let params = pbes2::Parameters::pbkdf2_sha256_aes256cbc(2048, &salt, &iv).expect("pbes2");
    encrypt_with(pkcs8_der, passphrase, params)
}

/// PBES2 with PBKDF2-SHA256 and DES-EDE3-CBC, as written by
/// `openssl pkcs12 -nocerts` when exporting a signer key.
pub fn encrypt_key_des3(pkcs8_der: &[u8], passphrase: &str) -> String {
    let salt = [5u8; 8];
    let iv = [3u8; 8];
    let params = pbes2::Parameters {
        kdf: pbes2::Pbkdf2Params::hmac_with_sha256(2048, &salt)
            .expect("pbkdf2")
            .into(),
        encryption: pbes2::EncryptionScheme::DesEde3Cbc { iv: &iv },
    };
    encrypt_with(pkcs8_der, passphrase, params)
}

fn encrypt_with(pkcs8_der: &[u8], passphrase: &str, params: pbes2::Parameters<'_>) -> String {
    let info = PrivateKeyInfo::try_from(pkcs8_der).expect("pkcs8 der");
    let encrypted = info
        .encrypt_with_params(params, passphrase)
        .expect("encrypt key");
    encrypted
        .to_pem("ENCRYPTED PRIVATE KEY", LineEnding::LF)
        .expect("pem")
        .to_string()
}
