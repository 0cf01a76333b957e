use crate::error::Result;
use crate::export::layout::{color_op, push_text, TableLayout, FONT_BOLD, FONT_REGULAR, PT_PER_MM};
use crate::normalize::normalize;
use crate::types::{ColumnSet, ExportConfig, NormalizedRow, Record};
use chrono::NaiveDateTime;
use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};

/// Build the paginated tabular document.
///
/// Page one carries the title and a metadata line with `generated_at` and
/// `original_count` (records before fan-out); the table of normalized rows follows
/// and flows onto further pages as needed. Output depends only on the arguments.
pub fn to_table(
    records: &[Record],
    columns: &ColumnSet,
    generated_at: NaiveDateTime,
    original_count: usize,
    config: &ExportConfig,
) -> Result<Vec<u8>> {
    let style = &config.table;
    let rows = normalize(records, columns);

    let header = columns.headers();
    let body: Vec<Vec<String>> = rows.iter().map(NormalizedRow::to_export_cells).collect();

    let layout = TableLayout::new(style);
    let mut pages = layout.layout(&header, &body);

    let mut first_page = Vec::new();
    first_page.push(color_op("rg", style.title_color));
    push_text(
        &mut first_page,
        FONT_REGULAR,
        style.title_font_size,
        style.title_x,
        layout.to_pdf_y(style.title_y),
        &config.title,
    );
    first_page.push(color_op("rg", style.meta_color));
    let metadata = format!(
        "Generated: {} | Original Records: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        original_count
    );
    push_text(
        &mut first_page,
        FONT_REGULAR,
        style.meta_font_size,
        style.title_x,
        layout.to_pdf_y(style.meta_y),
        &metadata,
    );
    if let Some(table_ops) = pages.first_mut() {
        first_page.append(table_ops);
        *table_ops = first_page;
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        0i64.into(),
        0i64.into(),
        (style.page_width * PT_PER_MM).into(),
        (style.page_height * PT_PER_MM).into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;

    log::debug!(
        "built {} page table document from {} records ({} rows)",
        page_count,
        original_count,
        rows.len()
    );
    Ok(buffer)
}
