//! ページ描画の基本操作
//!
//! 座標はすべて mm・左上原点で受け取り、PDF座標（pt・左下原点）へ変換する。

use crate::error::{CatalogExportError, Result};
use catalog_export_common::layout::{mm_to_pt, pt_to_mm, Align};
use catalog_export_common::text::{to_win_ansi, TextMeasure};
use printpdf::font::ParsedFont;
use printpdf::graphics::{LinePoint, PaintMode, Point, Polygon, PolygonRing, WindingOrder};
use printpdf::xobject::XObjectTransform;
use printpdf::{BuiltinFont, Op, PdfDocument, Pt, RawImage, Rgb, TextItem, TextMatrix, XObjectId};

/// mm単位の矩形（左上原点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Rect {
    pub fn new(x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32) -> Self {
        Self { x_mm, y_mm, width_mm, height_mm }
    }

    /// 中央に `width × height` の矩形を置く
    pub fn centered(&self, width_mm: f32, height_mm: f32) -> Rect {
        Rect {
            x_mm: self.x_mm + (self.width_mm - width_mm) / 2.0,
            y_mm: self.y_mm + (self.height_mm - height_mm) / 2.0,
            width_mm,
            height_mm,
        }
    }
}

/// RGB（0.0-1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub f32, pub f32, pub f32);

impl Color {
    pub const WHITE: Color = Color(1.0, 1.0, 1.0);
    pub const TEXT: Color = Color(0.15, 0.2, 0.15);
    pub const MUTED: Color = Color(0.4, 0.45, 0.4);
    pub const HEADER: Color = Color(0.36, 0.45, 0.36);
    pub const ROW_TINT: Color = Color(0.95, 0.97, 0.95);
    pub const BORDER: Color = Color(0.8, 0.83, 0.8);

    fn to_pdf(self) -> printpdf::color::Color {
        printpdf::color::Color::Rgb(Rgb::new(self.0, self.1, self.2, None))
    }
}

/// 文字スタイル
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size_pt: f32,
    pub bold: bool,
    pub color: Color,
}

impl TextStyle {
    pub fn regular(size_pt: f32) -> Self {
        Self { size_pt, bold: false, color: Color::TEXT }
    }

    pub fn bold(size_pt: f32) -> Self {
        Self { size_pt, bold: true, color: Color::TEXT }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn font(&self) -> BuiltinFont {
        if self.bold {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        }
    }
}

/// 組み込みフォントの字幅・字高
///
/// printpdf 同梱のフォントデータ（`BuiltinFont::get_subset_font`）から読む。
#[derive(Debug, Clone)]
pub struct FontMetrics {
    font: ParsedFont,
}

impl FontMetrics {
    pub fn load(builtin: BuiltinFont) -> Result<Self> {
        let subset = builtin.get_subset_font();
        let mut warnings = Vec::new();
        let font = ParsedFont::from_bytes(&subset.bytes, 0, &mut warnings).ok_or_else(|| {
            CatalogExportError::PdfGeneration(format!("組み込みフォントを読み込めません: {}", builtin.get_id()))
        })?;
        Ok(Self { font })
    }

    fn units_per_em(&self) -> f32 {
        self.font.font_metrics.units_per_em.max(1) as f32
    }

    /// 字送り（フォント単位）。グリフがなければ '?' の幅
    fn advance(&self, c: char) -> u16 {
        self.font
            .lookup_glyph_index(c as u32)
            .or_else(|| self.font.lookup_glyph_index('?' as u32))
            .map(|glyph| self.font.get_horizontal_advance(glyph))
            .unwrap_or_default()
    }

    /// 大文字の高さ（pt）。OS/2 に値がなければアセンダー
    pub fn cap_height_pt(&self, font_size_pt: f32) -> f32 {
        let metrics = &self.font.font_metrics;
        metrics
            .get_s_cap_height(font_size_pt)
            .unwrap_or_else(|| metrics.get_ascender(font_size_pt))
    }
}

impl TextMeasure for FontMetrics {
    fn width_pt(&self, text: &str, font_size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.advance(c) as u32).sum();
        units as f32 / self.units_per_em() * font_size_pt
    }
}

/// 本文・太字の計測をまとめたもの
#[derive(Debug, Clone)]
pub struct FontSet {
    regular: FontMetrics,
    bold: FontMetrics,
}

impl FontSet {
    pub fn load() -> Result<Self> {
        Ok(Self {
            regular: FontMetrics::load(BuiltinFont::Helvetica)?,
            bold: FontMetrics::load(BuiltinFont::HelveticaBold)?,
        })
    }

    pub fn regular(&self) -> &FontMetrics {
        &self.regular
    }

    pub fn for_style(&self, style: &TextStyle) -> &FontMetrics {
        if style.bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    pub fn measure_pt(&self, text: &str, style: &TextStyle) -> f32 {
        self.for_style(style).width_pt(text, style.size_pt)
    }
}

/// 1ページ分の描画先
///
/// 画像XObjectの登録にドキュメントを借用し、描画命令はページごとに溜める。
pub struct PageSurface<'a> {
    doc: &'a mut PdfDocument,
    fonts: &'a FontSet,
    ops: Vec<Op>,
    page_height_mm: f32,
}

impl<'a> PageSurface<'a> {
    pub fn new(doc: &'a mut PdfDocument, fonts: &'a FontSet, page_height_mm: f32) -> Self {
        Self { doc, fonts, ops: Vec::new(), page_height_mm }
    }

    pub fn fonts(&self) -> &'a FontSet {
        self.fonts
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// 上からのmm → PDFのy（pt）
    fn pdf_y(&self, y_mm: f32) -> Pt {
        Pt(mm_to_pt(self.page_height_mm - y_mm))
    }

    fn rect_polygon(&self, rect: &Rect, mode: PaintMode) -> Polygon {
        let left = Pt(mm_to_pt(rect.x_mm));
        let right = Pt(mm_to_pt(rect.x_mm + rect.width_mm));
        let top = self.pdf_y(rect.y_mm);
        let bottom = self.pdf_y(rect.y_mm + rect.height_mm);
        Polygon {
            rings: vec![PolygonRing {
                points: vec![
                    LinePoint { p: Point { x: left, y: bottom }, bezier: false },
                    LinePoint { p: Point { x: right, y: bottom }, bezier: false },
                    LinePoint { p: Point { x: right, y: top }, bezier: false },
                    LinePoint { p: Point { x: left, y: top }, bezier: false },
                ],
            }],
            mode,
            winding_order: WindingOrder::EvenOdd,
        }
    }

    pub fn fill_rect(&mut self, rect: &Rect, color: Color) {
        let polygon = self.rect_polygon(rect, PaintMode::Fill);
        self.ops.push(Op::SetFillColor { col: color.to_pdf() });
        self.ops.push(Op::DrawPolygon { polygon });
    }

    pub fn stroke_rect(&mut self, rect: &Rect, color: Color, thickness_pt: f32) {
        let polygon = self.rect_polygon(rect, PaintMode::Stroke);
        self.ops.push(Op::SetOutlineThickness { pt: Pt(thickness_pt) });
        self.ops.push(Op::SetOutlineColor { col: color.to_pdf() });
        self.ops.push(Op::DrawPolygon { polygon });
    }

    /// 水平線
    pub fn hline(&mut self, x1_mm: f32, x2_mm: f32, y_mm: f32, color: Color, thickness_pt: f32) {
        let y = self.pdf_y(y_mm);
        let polygon = Polygon {
            rings: vec![PolygonRing {
                points: vec![
                    LinePoint { p: Point { x: Pt(mm_to_pt(x1_mm)), y }, bezier: false },
                    LinePoint { p: Point { x: Pt(mm_to_pt(x2_mm)), y }, bezier: false },
                ],
            }],
            mode: PaintMode::Stroke,
            winding_order: WindingOrder::EvenOdd,
        };
        self.ops.push(Op::SetOutlineThickness { pt: Pt(thickness_pt) });
        self.ops.push(Op::SetOutlineColor { col: color.to_pdf() });
        self.ops.push(Op::DrawPolygon { polygon });
    }

    /// ベースライン位置にテキストを書く
    pub fn text(&mut self, text: &str, x_mm: f32, baseline_mm: f32, style: TextStyle) {
        let text = to_win_ansi(text);
        if text.is_empty() {
            return;
        }
        let y = self.pdf_y(baseline_mm);
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetFillColor { col: style.color.to_pdf() });
        self.ops.push(Op::SetFontSizeBuiltinFont { size: Pt(style.size_pt), font: style.font() });
        self.ops.push(Op::SetTextMatrix { matrix: TextMatrix::Translate(Pt(mm_to_pt(x_mm)), y) });
        self.ops.push(Op::WriteTextBuiltinFont { items: vec![TextItem::Text(text)], font: style.font() });
        self.ops.push(Op::EndTextSection);
    }

    /// 幅 `width_mm` の枠内で揃えて書く
    pub fn text_aligned(
        &mut self,
        text: &str,
        x_mm: f32,
        width_mm: f32,
        baseline_mm: f32,
        align: Align,
        style: TextStyle,
    ) {
        let text_width_mm = pt_to_mm(self.fonts.measure_pt(&to_win_ansi(text), &style));
        let x = match align {
            Align::Left => x_mm,
            Align::Center => x_mm + (width_mm - text_width_mm) / 2.0,
            Align::Right => x_mm + width_mm - text_width_mm,
        };
        self.text(text, x, baseline_mm, style);
    }

    /// 画像をドキュメントに登録
    pub fn add_image(&mut self, image: &RawImage) -> XObjectId {
        self.doc.add_image(image)
    }

    /// 登録済み画像を矩形に配置（`pixel_size` は元画像のpx）
    pub fn place_image(&mut self, id: XObjectId, pixel_size: (u32, u32), rect: &Rect) {
        let (px_w, px_h) = pixel_size;
        if px_w == 0 || px_h == 0 {
            return;
        }
        // dpi=72 で 1px = 1pt
        let transform = XObjectTransform {
            translate_x: Some(Pt(mm_to_pt(rect.x_mm))),
            translate_y: Some(self.pdf_y(rect.y_mm + rect.height_mm)),
            scale_x: Some(mm_to_pt(rect.width_mm) / px_w as f32),
            scale_y: Some(mm_to_pt(rect.height_mm) / px_h as f32),
            rotate: None,
            dpi: Some(72.0),
        };
        self.ops.push(Op::UseXobject { id, transform });
    }
}
