//! Minimal OOXML word-processing document writer: a zip container with
//! content types, relationships, styles, one document part and embedded
//! PNG media. Supports exactly what the reports need: headings,
//! paragraphs and full-width images, in insertion order.

use anyhow::{anyhow, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Page-width image size: 6 inches in EMUs.
const IMAGE_WIDTH_EMU: u64 = 6 * 914_400;

#[derive(Debug, Clone)]
enum Block {
    Heading {
        level: u8,
        text: String,
        centered: bool,
    },
    Paragraph(String),
    Image(usize),
}

#[derive(Debug, Default)]
pub struct DocxBuilder {
    blocks: Vec<Block>,
    images: Vec<Vec<u8>>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&mut self, level: u8, text: &str) -> &mut Self {
        self.blocks.push(Block::Heading {
            level: level.clamp(1, 3),
            text: text.to_string(),
            centered: false,
        });
        self
    }

    pub fn centered_heading(&mut self, level: u8, text: &str) -> &mut Self {
        self.blocks.push(Block::Heading {
            level: level.clamp(1, 3),
            text: text.to_string(),
            centered: true,
        });
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.blocks.push(Block::Paragraph(text.to_string()));
        self
    }

    /// Embed a PNG image as its own paragraph, scaled to page width.
    pub fn image(&mut self, png: Vec<u8>) -> &mut Self {
        self.images.push(png);
        self.blocks.push(Block::Image(self.images.len() - 1));
        self
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut archive = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default();

        archive.start_file("[Content_Types].xml", options)?;
        archive.write_all(CONTENT_TYPES.as_bytes())?;

        archive.start_file("_rels/.rels", options)?;
        archive.write_all(PACKAGE_RELS.as_bytes())?;

        archive.start_file("word/styles.xml", options)?;
        archive.write_all(STYLES.as_bytes())?;

        archive.start_file("word/_rels/document.xml.rels", options)?;
        archive.write_all(self.document_rels().as_bytes())?;

        archive.start_file("word/document.xml", options)?;
        archive.write_all(self.document_xml()?.as_bytes())?;

        for (i, png) in self.images.iter().enumerate() {
            archive.start_file(format!("word/media/image{}.png", i + 1), options)?;
            archive.write_all(png)?;
        }

        archive.finish()?;
        Ok(buffer.into_inner())
    }

    fn document_rels(&self) -> String {
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        for i in 0..self.images.len() {
            rels.push_str(&format!(
                r#"
<Relationship Id="rIdImg{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image{n}.png"/>"#,
                n = i + 1
            ));
        }
        rels.push_str("\n</Relationships>");
        rels
    }

    fn document_xml(&self) -> Result<String> {
        let mut body = String::new();

        for block in &self.blocks {
            match block {
                Block::Heading {
                    level,
                    text,
                    centered,
                } => {
                    let justify = if *centered {
                        r#"<w:jc w:val="center"/>"#
                    } else {
                        ""
                    };
                    body.push_str(&format!(
                        r#"<w:p><w:pPr><w:pStyle w:val="Heading{}"/>{}</w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                        level,
                        justify,
                        escape_xml(text)
                    ));
                }
                Block::Paragraph(text) => {
                    body.push_str(&format!(
                        r#"<w:p><w:r><w:rPr><w:sz w:val="24"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                        escape_xml(text)
                    ));
                }
                Block::Image(index) => {
                    body.push_str(&self.image_xml(*index)?);
                }
            }
        }

        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            body
        ))
    }

    fn image_xml(&self, index: usize) -> Result<String> {
        let png = &self.images[index];
        let decoded = image::load_from_memory(png)
            .map_err(|e| anyhow!("Embedded image {} is not a valid PNG: {}", index + 1, e))?;

        let cx = IMAGE_WIDTH_EMU;
        let cy = IMAGE_WIDTH_EMU * decoded.height() as u64 / decoded.width().max(1) as u64;
        let n = index + 1;

        Ok(format!(
            r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{n}" name="chart{n}"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:nvPicPr><pic:cNvPr id="{n}" name="chart{n}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="rIdImg{n}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        ))
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:rPr><w:b/><w:sz w:val="36"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:rPr><w:b/><w:sz w:val="30"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style>
</w:styles>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::chart::bar_chart_png;
    use std::io::Read;

    fn read_part(docx: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx.to_vec())).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn every_insight_line_appears_in_the_document() {
        let lines = [
            "Average Attendance: 77.33%",
            "Maths: 71.67/100",
            "Insights: Attendance is moderately impacting performance.",
        ];

        let mut builder = DocxBuilder::new();
        builder.heading(1, "Class Insights");
        for line in &lines {
            builder.paragraph(line);
        }
        let docx = builder.build().unwrap();

        let document = read_part(&docx, "word/document.xml");
        for line in &lines {
            assert!(document.contains(line), "missing line: {}", line);
        }
    }

    #[test]
    fn blocks_keep_display_order() {
        let mut builder = DocxBuilder::new();
        builder
            .heading(1, "First")
            .paragraph("second")
            .heading(2, "Third")
            .paragraph("fourth");
        let docx = builder.build().unwrap();

        let document = read_part(&docx, "word/document.xml");
        let positions: Vec<usize> = ["First", "second", "Third", "fourth"]
            .iter()
            .map(|s| document.find(s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn one_embedded_image_per_chart_in_order() {
        let chart_a = bar_chart_png(&[("Maths".to_string(), 70.0)], 120, 80).unwrap();
        let chart_b = bar_chart_png(&[("Science".to_string(), 40.0)], 120, 80).unwrap();

        let mut builder = DocxBuilder::new();
        builder.paragraph("insight");
        builder.image(chart_a);
        builder.image(chart_b);
        let docx = builder.build().unwrap();

        let document = read_part(&docx, "word/document.xml");
        assert!(document.find("rIdImg1").unwrap() < document.find("rIdImg2").unwrap());

        let rels = read_part(&docx, "word/_rels/document.xml.rels");
        assert!(rels.contains("media/image1.png"));
        assert!(rels.contains("media/image2.png"));

        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        assert!(archive.by_name("word/media/image1.png").is_ok());
        drop(archive);
    }

    #[test]
    fn special_characters_are_escaped() {
        let mut builder = DocxBuilder::new();
        builder.paragraph("<Maths & Science> \"advanced\"");
        let docx = builder.build().unwrap();

        let document = read_part(&docx, "word/document.xml");
        assert!(document.contains("&lt;Maths &amp; Science&gt; &quot;advanced&quot;"));
        assert!(!document.contains("<Maths"));
    }

    #[test]
    fn invalid_image_bytes_fail_the_build() {
        let mut builder = DocxBuilder::new();
        builder.image(vec![1, 2, 3]);
        assert!(builder.build().is_err());
    }

    #[test]
    fn package_has_required_parts() {
        let mut builder = DocxBuilder::new();
        builder.heading(1, "T");
        let docx = builder.build().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {}", part);
        }
    }
}
