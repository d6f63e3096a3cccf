//! Writing CFF INDEX structures.

/// Append an INDEX holding `items`, using the smallest offset size that fits.
pub(crate) fn write_index<T: AsRef<[u8]>>(items: &[T], out: &mut Vec<u8>) {
    out.extend((items.len() as u16).to_be_bytes());
    if items.is_empty() {
        return;
    }
    let data_len: usize = items.iter().map(|item| item.as_ref().len()).sum();
    // offsets are 1-based
    let last_offset = data_len + 1;
    let off_size: u8 = match last_offset {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    };
    out.push(off_size);
    let mut offset = 1;
    write_offset(offset, off_size, out);
    for item in items {
        offset += item.as_ref().len();
        write_offset(offset, off_size, out);
    }
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
}

/// The encoded size of an INDEX holding `items`.
pub(crate) fn index_len<T: AsRef<[u8]>>(items: &[T]) -> usize {
    let mut out = Vec::new();
    write_index(items, &mut out);
    out.len()
}

fn write_offset(offset: usize, off_size: u8, out: &mut Vec<u8>) {
    let bytes = (offset as u32).to_be_bytes();
    out.extend_from_slice(&bytes[4 - off_size as usize..]);
}
