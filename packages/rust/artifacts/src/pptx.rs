//! PPTX lecture deck assembly.
//!
//! A deck is planned as a list of [`Slide`]s, then serialized as a minimal
//! PresentationML package: one master, one blank layout, one theme, and
//! slides made of absolutely positioned text boxes and pictures.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use manubuild_manuscript::{ChapterFile, split_sections};
use manubuild_shared::{
    AppConfig, FigureId, ManubuildError, ProjectPaths, Result, SlidesConfig, write_atomic,
};

/// 10in x 7.5in in EMU.
pub const SLIDE_WIDTH: i64 = 9_144_000;
pub const SLIDE_HEIGHT: i64 = 6_858_000;

const MARGIN: i64 = 457_200;
const TITLE_TOP: i64 = 274_638;
const TITLE_HEIGHT: i64 = 1_143_000;
const BODY_TOP: i64 = 1_600_200;
const BODY_HEIGHT: i64 = 4_525_963;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// ---------------------------------------------------------------------------
// Deck planning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slide {
    Title { title: String, subtitle: String },
    Content { title: String, lines: Vec<String> },
    Figure { title: String, figure: FigureId },
}

/// Plan the slides for one volume.
///
/// Each chapter contributes a title slide and one content slide per section
/// (up to `max_sections`), followed by a slide for every figure in that
/// section.
pub fn plan_deck(title: &str, subtitle: &str, chapters: &[ChapterFile], config: &SlidesConfig) -> Vec<Slide> {
    let mut slides = vec![Slide::Title {
        title: title.to_string(),
        subtitle: subtitle.to_string(),
    }];

    for chapter in chapters {
        let sectioned = split_sections(&chapter.blocks(), config.section_level);
        let chapter_title = sectioned.title.clone().unwrap_or_else(|| chapter.title());
        slides.push(Slide::Title {
            title: chapter_title.clone(),
            subtitle: String::new(),
        });

        for section in sectioned.sections.iter().take(config.max_sections) {
            let slide_title = format!("{chapter_title} - {}", section.title);
            let lines = section
                .blocks
                .iter()
                .flat_map(|b| b.lines())
                .filter(|l| !l.trim().is_empty())
                .take(config.max_lines)
                .map(|l| truncate_chars(l.trim_end(), config.max_chars))
                .collect();
            slides.push(Slide::Content {
                title: slide_title.clone(),
                lines,
            });
            slides.extend(section.figures().map(|id| Slide::Figure {
                title: slide_title.clone(),
                figure: id.clone(),
            }));
        }
    }
    slides
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => s[..i].to_string(),
        None => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// What a PPTX build produced.
#[derive(Debug, Clone)]
pub struct PptxSummary {
    pub path: PathBuf,
    pub slides: usize,
    pub figures: usize,
    pub missing: Vec<FigureId>,
}

pub struct PptxBuilder {
    config: SlidesConfig,
    figures_dir: PathBuf,
    author: String,
}

struct Media {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl PptxBuilder {
    pub fn new(figures_dir: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self {
            config: config.slides.clone(),
            figures_dir: figures_dir.into(),
            author: config.project.author.clone(),
        }
    }

    pub fn from_config(paths: &ProjectPaths, config: &AppConfig) -> Self {
        Self::new(&paths.figures, config)
    }

    /// Plan and package a deck for `chapters`, writing it to `output`.
    #[instrument(skip_all, fields(output = %output.display(), chapters = chapters.len()))]
    pub fn build(
        &self,
        title: &str,
        subtitle: &str,
        chapters: &[ChapterFile],
        output: &Path,
    ) -> Result<PptxSummary> {
        let planned = plan_deck(title, subtitle, chapters, &self.config);

        let mut media = BTreeMap::new();
        let mut missing = Vec::new();
        let mut slides = Vec::with_capacity(planned.len());
        for slide in planned {
            if let Slide::Figure { figure, .. } = &slide {
                if !media.contains_key(figure) {
                    match self.load_media(figure) {
                        Some(m) => {
                            media.insert(figure.clone(), m);
                        }
                        None => {
                            warn!(figure = %figure, "figure image missing, slide skipped");
                            if !missing.contains(figure) {
                                missing.push(figure.clone());
                            }
                            continue;
                        }
                    }
                }
            }
            slides.push(slide);
        }

        let bytes = package(title, &self.author, &slides, &media)?;
        write_atomic(output, &bytes)?;

        info!(slides = slides.len(), figures = media.len(), size = bytes.len(), "PPTX written");

        Ok(PptxSummary {
            path: output.to_path_buf(),
            slides: slides.len(),
            figures: media.len(),
            missing,
        })
    }

    fn load_media(&self, id: &FigureId) -> Option<Media> {
        let path = self.figures_dir.join(id.file_name());
        let bytes = std::fs::read(&path).ok()?;
        match image::load_from_memory_with_format(&bytes, image::ImageFormat::Png) {
            Ok(img) => Some(Media {
                width: img.width(),
                height: img.height(),
                bytes,
            }),
            Err(e) => {
                warn!(figure = %id, error = %e, "unreadable figure image");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Packaging
// ---------------------------------------------------------------------------

fn package(
    title: &str,
    author: &str,
    slides: &[Slide],
    media: &BTreeMap<FigureId, Media>,
) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut put = |name: &str, data: &[u8]| -> Result<()> {
        zip.start_file(name, options).map_err(package_err)?;
        zip.write_all(data).map_err(package_err)?;
        Ok(())
    };

    put("[Content_Types].xml", content_types(slides.len()).as_bytes())?;
    put("_rels/.rels", ROOT_RELS.as_bytes())?;
    put("docProps/core.xml", core_props(title, author).as_bytes())?;
    put("docProps/app.xml", app_props(slides.len()).as_bytes())?;
    put("ppt/presentation.xml", presentation(slides.len()).as_bytes())?;
    put("ppt/_rels/presentation.xml.rels", presentation_rels(slides.len()).as_bytes())?;
    put("ppt/slideMasters/slideMaster1.xml", slide_master().as_bytes())?;
    put("ppt/slideMasters/_rels/slideMaster1.xml.rels", MASTER_RELS.as_bytes())?;
    put("ppt/slideLayouts/slideLayout1.xml", slide_layout().as_bytes())?;
    put("ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS.as_bytes())?;
    put("ppt/theme/theme1.xml", THEME.as_bytes())?;

    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        let (xml, figure) = slide_xml(slide, media);
        put(&format!("ppt/slides/slide{n}.xml"), xml.as_bytes())?;
        put(
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            slide_rels(figure).as_bytes(),
        )?;
    }

    for (id, m) in media {
        put(&format!("ppt/media/{}", id.file_name()), &m.bytes)?;
    }

    let cursor = zip.finish().map_err(package_err)?;
    debug!(slides = slides.len(), "package assembled");
    Ok(cursor.into_inner())
}

fn package_err(e: impl std::fmt::Display) -> ManubuildError {
    ManubuildError::Package(e.to_string())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn content_types(slides: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>
<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#
    );
    for n in 1..=slides {
        let _ = writeln!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        );
    }
    xml.push_str("</Types>\n");
    xml
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>
"#;

fn core_props(title: &str, author: &str) -> String {
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>{}</dc:title>
<dc:creator>{}</dc:creator>
</cp:coreProperties>
"#,
        escape_xml(title),
        escape_xml(author)
    )
}

fn app_props(slides: usize) -> String {
    format!(
        r#"{XML_DECL}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>manubuild</Application>
<Slides>{slides}</Slides>
</Properties>
"#
    )
}

fn presentation(slides: usize) -> String {
    let ids: String = (0..slides)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3))
        .collect();
    format!(
        r#"{XML_DECL}
<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst>{ids}</p:sldIdLst>
<p:sldSz cx="{SLIDE_WIDTH}" cy="{SLIDE_HEIGHT}"/>
<p:notesSz cx="{SLIDE_HEIGHT}" cy="{SLIDE_WIDTH}"/>
</p:presentation>
"#
    )
}

fn presentation_rels(slides: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="{REL}/slideMaster" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="{REL}/theme" Target="theme/theme1.xml"/>
"#
    );
    for n in 1..=slides {
        let _ = writeln!(
            xml,
            r#"<Relationship Id="rId{}" Type="{REL}/slide" Target="slides/slide{n}.xml"/>"#,
            n + 2
        );
    }
    xml.push_str("</Relationships>\n");
    xml
}

const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}
<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>
</p:sldMaster>
"#
    )
}

const MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/>
</Relationships>
"#;

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}
<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1">
<p:cSld name="Blank"><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>
"#
    )
}

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/>
</Relationships>
"#;

fn slide_rels(figure: Option<&FigureId>) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="{REL}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
"#
    );
    if let Some(id) = figure {
        let _ = writeln!(
            xml,
            r#"<Relationship Id="rId2" Type="{REL}/image" Target="../media/{}"/>"#,
            id.file_name()
        );
    }
    xml.push_str("</Relationships>\n");
    xml
}

// ---------------------------------------------------------------------------
// Slide shapes
// ---------------------------------------------------------------------------

struct TextBox<'a> {
    id: u32,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    /// Hundredths of a point.
    size: u32,
    bold: bool,
    centered: bool,
    color: &'a str,
    paragraphs: &'a [String],
}

fn text_box(b: &TextBox<'_>) -> String {
    let align = if b.centered { r#" algn="ctr""# } else { "" };
    let bold = if b.bold { r#" b="1""# } else { "" };
    let paragraphs: String = b
        .paragraphs
        .iter()
        .map(|p| {
            format!(
                r#"<a:p><a:pPr{align}/><a:r><a:rPr lang="ja-JP" sz="{}"{bold} dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
                b.size,
                b.color,
                escape_xml(p)
            )
        })
        .collect();
    let paragraphs = if paragraphs.is_empty() {
        "<a:p><a:endParaRPr lang=\"ja-JP\"/></a:p>".to_string()
    } else {
        paragraphs
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        id = b.id,
        x = b.x,
        y = b.y,
        cx = b.cx,
        cy = b.cy,
    )
}

fn picture(id: u32, m: &Media) -> String {
    let (area_w, area_h) = (SLIDE_WIDTH - 2 * MARGIN, BODY_HEIGHT);
    let (w, h) = (m.width.max(1) as i64, m.height.max(1) as i64);
    let (cx, cy) = if w * area_h > h * area_w {
        (area_w, area_w * h / w)
    } else {
        (area_h * w / h, area_h)
    };
    let x = MARGIN + (area_w - cx) / 2;
    let y = BODY_TOP + (area_h - cy) / 2;
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Figure {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
    )
}

/// Slide XML plus the figure it embeds, if any.
fn slide_xml<'a>(slide: &'a Slide, media: &BTreeMap<FigureId, Media>) -> (String, Option<&'a FigureId>) {
    let mut shapes = String::new();
    let mut figure = None;

    match slide {
        Slide::Title { title, subtitle } => {
            shapes.push_str(&text_box(&TextBox {
                id: 2,
                x: 685_800,
                y: 2_130_425,
                cx: 7_772_400,
                cy: 1_470_025,
                size: 4000,
                bold: true,
                centered: true,
                color: "2E4053",
                paragraphs: std::slice::from_ref(title),
            }));
            if !subtitle.is_empty() {
                shapes.push_str(&text_box(&TextBox {
                    id: 3,
                    x: 1_371_600,
                    y: 3_886_200,
                    cx: 6_400_800,
                    cy: 1_752_600,
                    size: 2400,
                    bold: false,
                    centered: true,
                    color: "595959",
                    paragraphs: std::slice::from_ref(subtitle),
                }));
            }
        }
        Slide::Content { title, lines } => {
            shapes.push_str(&title_box(title));
            shapes.push_str(&text_box(&TextBox {
                id: 3,
                x: MARGIN,
                y: BODY_TOP,
                cx: SLIDE_WIDTH - 2 * MARGIN,
                cy: BODY_HEIGHT,
                size: 1800,
                bold: false,
                centered: false,
                color: "000000",
                paragraphs: lines,
            }));
        }
        Slide::Figure { title, figure: id } => {
            shapes.push_str(&title_box(title));
            if let Some(m) = media.get(id) {
                shapes.push_str(&picture(3, m));
                figure = Some(id);
            }
        }
    }

    let xml = format!(
        r#"{XML_DECL}
<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:cSld><p:spTree>{EMPTY_TREE}{shapes}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>
"#
    );
    (xml, figure)
}

fn title_box(title: &str) -> String {
    text_box(&TextBox {
        id: 2,
        x: MARGIN,
        y: TITLE_TOP,
        cx: SLIDE_WIDTH - 2 * MARGIN,
        cy: TITLE_HEIGHT,
        size: 2800,
        bold: true,
        centered: false,
        color: "1F618D",
        paragraphs: &[title.to_string()],
    })
}

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="manubuild">
<a:themeElements>
<a:clrScheme name="manubuild">
<a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1>
<a:dk2><a:srgbClr val="2E4053"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>
<a:accent1><a:srgbClr val="1F618D"/></a:accent1><a:accent2><a:srgbClr val="2874A6"/></a:accent2>
<a:accent3><a:srgbClr val="27AE60"/></a:accent3><a:accent4><a:srgbClr val="F39C12"/></a:accent4>
<a:accent5><a:srgbClr val="8E44AD"/></a:accent5><a:accent6><a:srgbClr val="C0392B"/></a:accent6>
<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
</a:clrScheme>
<a:fontScheme name="manubuild">
<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface="Yu Gothic"/><a:cs typeface=""/></a:majorFont>
<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface="Yu Gothic"/><a:cs typeface=""/></a:minorFont>
</a:fontScheme>
<a:fmtScheme name="manubuild">
<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>
<a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>
<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>
<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>
</a:fmtScheme>
</a:themeElements>
</a:theme>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mb-pptx-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn chapter(number: u32, content: &str) -> ChapterFile {
        ChapterFile {
            path: PathBuf::from(format!("chapter_{number:02}.md")),
            number,
            content: content.to_string(),
        }
    }

    fn read_entry(archive: &mut zip::ZipArchive<std::fs::File>, name: &str) -> String {
        let mut out = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn plans_title_chapter_and_section_slides() {
        let md = "# 第1章｜BIM\n\n導入\n\n#### 1.1 概要\n\n- a\n- b\n\n![FIG:f1]()\n\n#### 1.2 詳細\n\n本文";
        let slides = plan_deck("Deck", "Sub", &[chapter(1, md)], &SlidesConfig::default());

        assert_eq!(
            slides,
            vec![
                Slide::Title { title: "Deck".into(), subtitle: "Sub".into() },
                Slide::Title { title: "第1章｜BIM".into(), subtitle: String::new() },
                Slide::Content {
                    title: "第1章｜BIM - 1.1 概要".into(),
                    lines: vec!["• a".into(), "• b".into()],
                },
                Slide::Figure {
                    title: "第1章｜BIM - 1.1 概要".into(),
                    figure: FigureId::new("f1").unwrap(),
                },
                Slide::Content {
                    title: "第1章｜BIM - 1.2 詳細".into(),
                    lines: vec!["本文".into()],
                },
            ]
        );
    }

    #[test]
    fn caps_sections_lines_and_chars() {
        let config = SlidesConfig {
            max_sections: 2,
            max_lines: 3,
            max_chars: 4,
            ..SlidesConfig::default()
        };
        let body = (1..=6).map(|i| format!("- 行{i}番目のテキスト")).collect::<Vec<_>>().join("\n");
        let md = format!("# T\n\n#### A\n\n{body}\n\n#### B\n\nx\n\n#### C\n\ny\n");
        let slides = plan_deck("D", "", &[chapter(1, &md)], &config);

        assert_eq!(slides.len(), 4);
        let Slide::Content { lines, .. } = &slides[2] else {
            panic!("expected content slide");
        };
        assert_eq!(lines, &vec!["• 行1".to_string(), "• 行2".into(), "• 行3".into()]);
    }

    #[test]
    fn chapter_without_heading_uses_file_stem() {
        let slides = plan_deck("D", "", &[chapter(7, "本文だけ")], &SlidesConfig::default());
        assert_eq!(
            slides[1],
            Slide::Title { title: "chapter_07".into(), subtitle: String::new() }
        );
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("あいうえお", 3), "あいう");
        assert_eq!(truncate_chars("ab", 3), "ab");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn writes_readable_package() {
        let dir = temp_dir();
        let figures = dir.join("figs");
        std::fs::create_dir_all(&figures).unwrap();
        image::RgbImage::from_pixel(40, 20, image::Rgb([10, 120, 200]))
            .save(figures.join("present.png"))
            .unwrap();

        let md = "# 第1章｜A & B\n\n#### 1.1 X\n\n本文\n\n![FIG:present]()\n\n![FIG:absent]()\n\n![FIG:present]()";
        let output = dir.join("dist/deck.pptx");
        let summary = PptxBuilder::new(&figures, &AppConfig::default())
            .build("Deck", "Sub", &[chapter(1, md)], &output)
            .unwrap();

        // deck title, chapter title, content, two figure slides
        assert_eq!(summary.slides, 5);
        assert_eq!(summary.figures, 1);
        assert_eq!(summary.missing, vec![FigureId::new("absent").unwrap()]);

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&output).unwrap()).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide5.xml",
            "ppt/slides/_rels/slide4.xml.rels",
            "ppt/media/present.png",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {part}");
        }
        assert!(archive.by_name("ppt/slides/slide6.xml").is_err());

        let presentation = read_entry(&mut archive, "ppt/presentation.xml");
        assert!(presentation.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));
        assert_eq!(presentation.matches("<p:sldId ").count(), 5);

        let chapter_slide = read_entry(&mut archive, "ppt/slides/slide2.xml");
        assert!(chapter_slide.contains("第1章｜A &amp; B"));

        let figure_rels = read_entry(&mut archive, "ppt/slides/_rels/slide4.xml.rels");
        assert!(figure_rels.contains("../media/present.png"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
