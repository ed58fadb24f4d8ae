#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

pub type SheetData = (String, Vec<Vec<String>>);

fn build_test_pdf(pages: &[Vec<&str>]) -> Result<Document, Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();

    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![16.into()]),
            Operation::new("Td", vec![50.into(), 780.into()]),
        ];

        for (index, line) in lines.iter().enumerate() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            if index + 1 < lines.len() {
                operations.push(Operation::new("T*", vec![]));
            }
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

/// Each inner vec is one page; each string is one line of Courier text.
pub fn create_test_pdf(path: &Path, pages: &[Vec<&str>]) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = build_test_pdf(pages)?;
    doc.save(path)?;
    Ok(())
}

pub fn test_pdf_bytes(pages: &[Vec<&str>]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = build_test_pdf(pages)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Password padding string from the standard security handler.
const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut state = (0..=255_u8).collect::<Vec<_>>();
    let mut j = 0_u8;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, usize::from(j));
    }

    let (mut i, mut j) = (0_u8, 0_u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[usize::from(i)]);
            state.swap(usize::from(i), usize::from(j));
            let k = state[usize::from(state[usize::from(i)].wrapping_add(state[usize::from(j)]))];
            byte ^ k
        })
        .collect()
}

/// A document encrypted with the standard security handler (revision 2,
/// 40-bit RC4) that only opens with `user_password`.
pub fn create_encrypted_pdf(
    path: &Path,
    pages: &[Vec<&str>],
    user_password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = build_test_pdf(pages)?;
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "P" => -4,
        "O" => Object::String(vec![0x11; 32], StringFormat::Hexadecimal),
        "U" => Object::String(vec![0x22; 32], StringFormat::Hexadecimal),
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(vec![0x33; 16], StringFormat::Hexadecimal),
            Object::String(vec![0x33; 16], StringFormat::Hexadecimal),
        ],
    );

    let key = get_encryption_key(&doc, user_password, false)
        .map_err(|error| format!("encryption key: {error:?}"))?;

    // RC4 is symmetric, so the per-object decryption routine also encrypts.
    for (&object_id, object) in &mut doc.objects {
        if object_id == encrypt_id {
            continue;
        }
        decrypt_object(&key, object_id, object)
            .map_err(|error| format!("encrypt object {object_id:?}: {error:?}"))?;
    }

    let user_entry = rc4(&key, &PASSWORD_PAD);
    doc.get_object_mut(encrypt_id)?
        .as_dict_mut()?
        .set("U", Object::String(user_entry, StringFormat::Hexadecimal));

    doc.save(path)?;
    Ok(())
}

fn collect_sheets<R>(workbook: &mut Xlsx<R>) -> Vec<SheetData>
where
    R: std::io::Read + std::io::Seek,
{
    workbook
        .sheet_names()
        .into_iter()
        .map(|name| {
            let range = workbook
                .worksheet_range(&name)
                .expect("sheet listed in workbook should be readable");
            let rows = range
                .rows()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect();
            (name, rows)
        })
        .collect()
}

pub fn read_sheets(path: &Path) -> Vec<SheetData> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook should open");
    collect_sheets(&mut workbook)
}

pub fn read_sheets_from_bytes(bytes: &[u8]) -> Vec<SheetData> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes.to_vec())).expect("workbook bytes should parse");
    collect_sheets(&mut workbook)
}

pub fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(ToString::to_string).collect()
}
