use crate::api::BunApi;
use crate::error::Result;
use std::io::{self, Write};

const VERSIONS_PER_LINE: usize = 8;

/// Print all available Bun versions to stdout, eight per line, tab separated.
///
/// The listing is command output, so it does not go through the log and is
/// printed regardless of `--quiet`.
pub async fn print_bun_versions(api: &BunApi) -> Result<()> {
    write_bun_versions(api, &mut io::stdout()).await
}

pub async fn write_bun_versions<W: Write>(api: &BunApi, out: &mut W) -> Result<()> {
    let versions = api.versions().await?;
    for line in format_version_chunks(&versions) {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

pub fn format_version_chunks(versions: &[String]) -> Vec<String> {
    versions
        .chunks(VERSIONS_PER_LINE)
        .map(|chunk| chunk.join("\t"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_of_eight() {
        let versions: Vec<String> = (0..10).map(|i| format!("1.0.{i}")).collect();
        let lines = format_version_chunks(&versions);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "1.0.0\t1.0.1\t1.0.2\t1.0.3\t1.0.4\t1.0.5\t1.0.6\t1.0.7"
        );
        assert_eq!(lines[1], "1.0.8\t1.0.9");
    }

    #[test]
    fn test_no_versions() {
        assert!(format_version_chunks(&[]).is_empty());
    }
}
