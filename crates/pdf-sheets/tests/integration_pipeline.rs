mod common;

use std::process::Command;

use common::strings;
use pdf_sheets::{Conversion, ExtractError, ExtractOptions, extract_pdf_bytes_to_xlsx, extract_pdf_to_xlsx};
use tempfile::tempdir;

#[test]
fn merges_matching_pages_and_splits_on_header_change() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("multi.pdf");
    let output = dir.path().join("multi.xlsx");

    common::create_test_pdf(
        &input,
        &[
            vec!["Name  Age  Score", "Alice  30  98", "Bob  22  87"],
            vec!["Name  Age  Score", "Carol  41  75"],
            vec!["Product  Qty", "Pen  3", "Book  1"],
        ],
    )
    .expect("PDF fixture should be created");

    let conversion = extract_pdf_to_xlsx(&input, &output, &ExtractOptions::default())
        .expect("conversion should succeed");
    let report = conversion.report().clone();
    assert!(
        matches!(conversion, Conversion::Converted { .. }),
        "report: {report:?}"
    );
    assert_eq!(report.sheet_count(), 2, "report: {report:?}");
    assert_eq!(report.row_count, 5, "report: {report:?}");

    let sheets = common::read_sheets(&output);
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].0, "Sheet1");
    assert_eq!(
        sheets[0].1,
        vec![
            strings(&["Name", "Age", "Score"]),
            strings(&["Alice", "30", "98"]),
            strings(&["Bob", "22", "87"]),
            strings(&["Carol", "41", "75"]),
        ]
    );
    assert_eq!(sheets[1].0, "Sheet2");
    assert_eq!(sheets[1].1[0], strings(&["Product", "Qty"]));
    assert_eq!(sheets[1].1.len(), 3);
}

#[test]
fn page_without_table_does_not_break_a_run() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("gap.pdf");
    let output = dir.path().join("gap.xlsx");

    common::create_test_pdf(
        &input,
        &[
            vec!["City  Pop", "Oslo  10"],
            vec!["This page only has notes for the reader."],
            vec!["City  Pop", "Rome  20"],
        ],
    )
    .expect("PDF fixture should be created");

    let conversion = extract_pdf_to_xlsx(&input, &output, &ExtractOptions::default())
        .expect("conversion should succeed");
    assert_eq!(conversion.report().sheet_count(), 1);
    assert_eq!(conversion.report().table_count, 2);

    let sheets = common::read_sheets(&output);
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].1.len(), 3);
    assert_eq!(sheets[0].1[2], strings(&["Rome", "20"]));
}

#[test]
fn repeated_header_after_another_table_gets_its_own_sheet() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("abab.pdf");
    let output = dir.path().join("abab.xlsx");

    common::create_test_pdf(
        &input,
        &[
            vec!["Key  Value", "a  1"],
            vec!["Item  Count", "b  2"],
            vec!["Key  Value", "c  3"],
        ],
    )
    .expect("PDF fixture should be created");

    extract_pdf_to_xlsx(&input, &output, &ExtractOptions::default())
        .expect("conversion should succeed");

    let sheets = common::read_sheets(&output);
    let names = sheets.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Sheet1", "Sheet2", "Sheet3"]);
    assert_eq!(sheets[2].1[1], strings(&["c", "3"]));
}

#[test]
fn returns_no_tabular_data_without_writing_a_file() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("prose.pdf");
    let output = dir.path().join("prose.xlsx");

    common::create_test_pdf(
        &input,
        &[
            vec!["This is plain narrative text without columns."],
            vec!["Nothing tabular here either."],
        ],
    )
    .expect("PDF fixture should be created");

    let conversion = extract_pdf_to_xlsx(&input, &output, &ExtractOptions::default())
        .expect("a readable document without tables is not an error");
    match conversion {
        Conversion::NoTabularData(report) => {
            assert_eq!(report.page_count, 2);
            assert_eq!(report.sheet_count(), 0);
        }
        Conversion::Converted { report, .. } => panic!("unexpected sheets: {report:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn decrypts_with_the_user_password() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("locked.pdf");
    let output = dir.path().join("locked.xlsx");

    common::create_encrypted_pdf(&input, &[vec!["Name  Qty", "Pen  3", "Ink  4"]], "s3cret")
        .expect("PDF fixture should be created");

    let options = ExtractOptions {
        password: Some(" s3cret ".to_string()),
        ..ExtractOptions::default()
    };
    let conversion =
        extract_pdf_to_xlsx(&input, &output, &options).expect("right secret should decrypt");
    assert!(matches!(conversion, Conversion::Converted { .. }));

    let sheets = common::read_sheets(&output);
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].0, "Sheet1");
    assert_eq!(
        sheets[0].1,
        vec![
            strings(&["Name", "Qty"]),
            strings(&["Pen", "3"]),
            strings(&["Ink", "4"]),
        ]
    );
}

#[test]
fn wrong_or_missing_password_fails_without_writing_a_file() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("locked.pdf");
    let output = dir.path().join("locked.xlsx");

    common::create_encrypted_pdf(&input, &[vec!["A  B", "1  2"]], "s3cret")
        .expect("PDF fixture should be created");

    for password in [None, Some(""), Some("not-the-password")] {
        let options = ExtractOptions {
            password: password.map(str::to_string),
            ..ExtractOptions::default()
        };
        let err = extract_pdf_to_xlsx(&input, &output, &options)
            .expect_err("wrong secret should abort the conversion");
        assert!(
            matches!(err, ExtractError::Decryption(_)),
            "password {password:?}: unexpected error: {err:?}"
        );
        assert!(!output.exists());
    }
}

#[test]
fn converts_bytes_and_captures_preview() {
    let bytes = common::test_pdf_bytes(&[vec![
        "Item  Price",
        "Tea  3",
        "Cake  4",
        "Milk  2",
    ]])
    .expect("PDF fixture should be created");

    let options = ExtractOptions {
        preview_rows: 2,
        ..ExtractOptions::default()
    };
    let conversion = extract_pdf_bytes_to_xlsx(&bytes, &options).expect("conversion should succeed");
    let Conversion::Converted {
        output,
        report,
        preview,
    } = conversion
    else {
        panic!("expected a workbook");
    };

    assert_eq!(report.row_count, 3);
    let preview = preview.expect("first table has rows");
    assert_eq!(preview.rows.len(), 2);
    assert!(preview.to_html().contains("<td>Tea</td><td>3</td>"));

    let sheets = common::read_sheets_from_bytes(&output);
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].1[3], strings(&["Milk", "2"]));
}

#[test]
fn page_selection_limits_extraction() {
    let bytes = common::test_pdf_bytes(&[
        vec!["A  B", "1  2"],
        vec!["C  D", "3  4"],
    ])
    .expect("PDF fixture should be created");

    let options = ExtractOptions::default()
        .with_pages("2")
        .expect("selection should parse");
    let conversion = extract_pdf_bytes_to_xlsx(&bytes, &options).expect("conversion should succeed");

    assert_eq!(conversion.report().page_count, 1);
    let Conversion::Converted { output, .. } = conversion else {
        panic!("expected a workbook");
    };
    let sheets = common::read_sheets_from_bytes(&output);
    assert_eq!(sheets[0].1[0], strings(&["C", "D"]));
}

#[test]
fn cli_exits_with_code_2_when_no_tables() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("cli-empty.pdf");
    let output = dir.path().join("cli-empty.xlsx");

    common::create_test_pdf(&input, &[vec!["No table here"]])
        .expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2xlsx"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
    assert!(!output.exists());
}

#[test]
fn cli_writes_workbook_and_preview() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("cli.pdf");
    let output = dir.path().join("cli.xlsx");
    let preview = dir.path().join("preview.html");

    common::create_test_pdf(&input, &[vec!["Name  Age", "Alice  30", "Bob  22"]])
        .expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2xlsx"))
        .args([
            "convert",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
            "--preview-html",
            &preview.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(0));
    assert!(output.exists());
    let html = std::fs::read_to_string(&preview).expect("preview should be written");
    assert!(html.contains("<th>Name</th><th>Age</th>"), "preview: {html}");
}
