use crate::relay::constants::BYTES_PER_LINE;

/// Render payload bytes as a colon-separated two-digit uppercase hex dump,
/// eight bytes per line.
///
/// Four bytes `DE AD BE EF` render as `DE:AD:BE:EF`.
pub fn hex_dump(data: &[u8]) -> String {
    data.chunks(BYTES_PER_LINE)
        .map(|line| {
            line.iter()
                .map(|byte| format!("{:02X}", byte))
                .collect::<Vec<_>>()
                .join(":")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
