use std::io::{Cursor, Read};
use std::path::{Component, Path};

use flate2::read::GzDecoder;

use crate::error::{StoreError, StoreResult};

/// Name of the genesis member inside tar and zip archives.
pub const GENESIS_MEMBER: &str = "genesis.json";

/// Container format of a genesis source, inferred from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    TarGz,
    Zip,
}

impl Compression {
    /// Detect the container format from a file name or URL.
    ///
    /// Any `?query` or `#fragment` suffix of a URL is ignored.
    pub fn detect(name: &str) -> Self {
        let name = name
            .split(['?', '#'])
            .next()
            .unwrap_or(name)
            .to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Self::TarGz
        } else if name.ends_with(".gz") {
            Self::Gzip
        } else if name.ends_with(".zip") {
            Self::Zip
        } else {
            Self::None
        }
    }

    /// Unpack `raw` into the bytes of the genesis JSON.
    ///
    /// `origin` is only used in error messages.
    pub fn unpack(&self, raw: Vec<u8>, origin: &str) -> StoreResult<Vec<u8>> {
        match self {
            Self::None => Ok(raw),
            Self::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(&raw[..]).read_to_end(&mut out)?;
                Ok(out)
            }
            Self::TarGz => {
                let mut archive = tar::Archive::new(GzDecoder::new(&raw[..]));
                for entry in archive.entries()? {
                    let mut entry = entry?;
                    if is_genesis_member(&entry.path()?) {
                        let mut out = Vec::new();
                        entry.read_to_end(&mut out)?;
                        return Ok(out);
                    }
                }
                Err(missing_member(origin))
            }
            Self::Zip => {
                let mut archive = zip::ZipArchive::new(Cursor::new(raw))?;
                let mut file = match archive.by_name(GENESIS_MEMBER) {
                    Ok(file) => file,
                    Err(zip::result::ZipError::FileNotFound) => return Err(missing_member(origin)),
                    Err(e) => return Err(e.into()),
                };
                let mut out = Vec::new();
                file.read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}

/// True for `genesis.json` and `./genesis.json`.
fn is_genesis_member(path: &Path) -> bool {
    let mut parts = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    matches!(
        (parts.next(), parts.next()),
        (Some(Component::Normal(name)), None) if name == GENESIS_MEMBER
    )
}

fn missing_member(origin: &str) -> StoreError {
    StoreError::ArchiveMember {
        archive: origin.to_string(),
        member: GENESIS_MEMBER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const GENESIS: &[u8] = br#"{"chain_id": "cosmoshub-4"}"#;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn tar_gz(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        gzip(&builder.into_inner().unwrap())
    }

    fn zip_of(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in members {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn detect_by_suffix() {
        assert_eq!(Compression::detect("genesis.json"), Compression::None);
        assert_eq!(Compression::detect("genesis.json.gz"), Compression::Gzip);
        assert_eq!(Compression::detect("genesis.tar.gz"), Compression::TarGz);
        assert_eq!(Compression::detect("GENESIS.TGZ"), Compression::TarGz);
        assert_eq!(Compression::detect("genesis.zip"), Compression::Zip);
        assert_eq!(
            Compression::detect("https://host/genesis.json.gz?raw=true"),
            Compression::Gzip
        );
    }

    #[test]
    fn plain_bytes_pass_through() {
        let out = Compression::None.unpack(GENESIS.to_vec(), "x").unwrap();
        assert_eq!(out, GENESIS);
    }

    #[test]
    fn gzip_unpacks() {
        let out = Compression::Gzip.unpack(gzip(GENESIS), "g.gz").unwrap();
        assert_eq!(out, GENESIS);
    }

    #[test]
    fn tar_gz_finds_member_with_curdir_prefix() {
        let raw = tar_gz(&[("README", b"hi"), ("./genesis.json", GENESIS)]);
        let out = Compression::TarGz.unpack(raw, "g.tar.gz").unwrap();
        assert_eq!(out, GENESIS);
    }

    #[test]
    fn tar_gz_ignores_nested_genesis() {
        let raw = tar_gz(&[("config/genesis.json", GENESIS)]);
        let err = Compression::TarGz.unpack(raw, "g.tar.gz").unwrap_err();
        assert!(matches!(err, StoreError::ArchiveMember { .. }));
    }

    #[test]
    fn zip_unpacks_named_member() {
        let raw = zip_of(&[("other.txt", b"x"), ("genesis.json", GENESIS)]);
        let out = Compression::Zip.unpack(raw, "g.zip").unwrap();
        assert_eq!(out, GENESIS);
    }

    #[test]
    fn zip_without_member_fails() {
        let raw = zip_of(&[("other.txt", b"x")]);
        let err = Compression::Zip.unpack(raw, "g.zip").unwrap_err();
        match err {
            StoreError::ArchiveMember { archive, member } => {
                assert_eq!(archive, "g.zip");
                assert_eq!(member, "genesis.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
