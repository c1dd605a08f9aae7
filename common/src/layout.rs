//! レイアウト設定モジュール
//!
//! mm基準のテーブル定義（Source of Truth）
//! 列幅は内容に依存しない固定値。画像スタンプ座標を決定的にするため。

// ============================================
// mm基準レイアウト（Source of Truth）
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// 列幅（mm）: 画像, 商品名, バーコード, 入数, 重量, 価格
pub const COLUMN_WIDTHS_MM: [f32; 6] = [24.0, 62.0, 32.0, 18.0, 20.0, 34.0];

/// 上余白 / 下余白（下余白にフッターを描く）
pub const MARGIN_TOP_MM: f32 = 15.0;
pub const MARGIN_BOTTOM_MM: f32 = 20.0;

/// 1ページ目のタイトルブロック高さ（タイトル + サブタイトル + メタデータ行）
pub const TITLE_BLOCK_HEIGHT_MM: f32 = 30.0;

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

// ============================================
// 列定義
// ============================================

/// 水平方向の揃え
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// テーブル列（描画順）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Image,
    Name,
    Barcode,
    UnitsPerCase,
    Weight,
    Price,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Image,
        Column::Name,
        Column::Barcode,
        Column::UnitsPerCase,
        Column::Weight,
        Column::Price,
    ];

    pub fn index(&self) -> usize {
        match self {
            Column::Image => 0,
            Column::Name => 1,
            Column::Barcode => 2,
            Column::UnitsPerCase => 3,
            Column::Weight => 4,
            Column::Price => 5,
        }
    }

    /// 見出し（価格列はCurrencyModeに依存するため別途）
    pub fn header_label(&self) -> &'static str {
        match self {
            Column::Image => "Image",
            Column::Name => "Product",
            Column::Barcode => "Barcode",
            Column::UnitsPerCase => "Unit/Case",
            Column::Weight => "Weight",
            Column::Price => "Price",
        }
    }

    /// 商品名のみ左揃え、他は中央
    pub fn align(&self) -> Align {
        match self {
            Column::Name => Align::Left,
            _ => Align::Center,
        }
    }
}

// ============================================
// テーブル設定構造体
// ============================================

/// テーブルのジオメトリ（コンパイル時固定）
#[derive(Debug, Clone, PartialEq)]
pub struct TableGeometry {
    /// ページ幅（mm）
    pub page_width_mm: f32,
    /// ページ高さ（mm）
    pub page_height_mm: f32,
    /// 列幅（mm）
    pub column_widths_mm: [f32; 6],
    /// 画像の最大辺（mm）
    pub max_image_edge_mm: f32,
    /// 最小行高さ（mm）
    pub min_row_height_mm: f32,
    /// 見出し行高さ（mm）
    pub header_row_height_mm: f32,
    /// セル内余白（mm）
    pub cell_padding_mm: f32,
    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,
    /// 1ページ目のタイトルブロック高さ（mm）
    pub title_block_height_mm: f32,
    /// 本文フォントサイズ（pt）
    pub font_size_pt: f32,
    /// 見出しフォントサイズ（pt）
    pub header_font_size_pt: f32,
    /// 行送り（mm）
    pub line_height_mm: f32,
}

/// カタログ出力で使うジオメトリ
pub const CATALOG_TABLE: TableGeometry = TableGeometry::a4_portrait();

impl TableGeometry {
    pub const fn a4_portrait() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            column_widths_mm: COLUMN_WIDTHS_MM,
            max_image_edge_mm: 20.0,
            min_row_height_mm: 24.0,
            header_row_height_mm: 9.0,
            cell_padding_mm: 2.0,
            margin_top_mm: MARGIN_TOP_MM,
            margin_bottom_mm: MARGIN_BOTTOM_MM,
            title_block_height_mm: TITLE_BLOCK_HEIGHT_MM,
            font_size_pt: 9.0,
            header_font_size_pt: 9.0,
            line_height_mm: 4.2,
        }
    }

    /// テーブル全幅（mm）
    pub fn table_width_mm(&self) -> f32 {
        self.column_widths_mm.iter().sum()
    }

    /// テーブル左端: (ページ幅 - テーブル幅) / 2
    pub fn table_left_mm(&self) -> f32 {
        (self.page_width_mm - self.table_width_mm()) / 2.0
    }

    pub fn column_width_mm(&self, column: Column) -> f32 {
        self.column_widths_mm[column.index()]
    }

    /// 列の左端X座標（mm、左から）
    pub fn column_x_mm(&self, column: Column) -> f32 {
        self.table_left_mm()
            + self.column_widths_mm[..column.index()].iter().sum::<f32>()
    }

    /// テーブル開始Y座標（mm、上から）
    pub fn table_top_mm(&self, page_index: usize) -> f32 {
        if page_index == 0 {
            self.margin_top_mm + self.title_block_height_mm
        } else {
            self.margin_top_mm
        }
    }

    /// 見出し行の下から下余白までの、行に使える高さ（mm）
    pub fn row_budget_mm(&self, page_index: usize) -> f32 {
        self.page_height_mm
            - self.margin_bottom_mm
            - self.table_top_mm(page_index)
            - self.header_row_height_mm
    }

    /// 画像の描画辺: min(セル幅 - 余白, セル高さ - 余白, 最大辺)
    pub fn image_edge_mm(&self, row_height_mm: f32) -> f32 {
        let padding = self.cell_padding_mm * 2.0;
        (self.column_width_mm(Column::Image) - padding)
            .min(row_height_mm - padding)
            .min(self.max_image_edge_mm)
            .max(0.0)
    }

    /// セル内テキストの幅上限（pt）
    pub fn cell_text_width_pt(&self, column: Column) -> f32 {
        mm_to_pt(self.column_width_mm(column) - self.cell_padding_mm * 2.0)
    }

    /// セル内の最大行数から行高さを決める
    pub fn row_height_mm(&self, line_count: usize) -> f32 {
        let text_height = line_count.max(1) as f32 * self.line_height_mm + self.cell_padding_mm * 2.0;
        text_height.max(self.min_row_height_mm)
    }
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// mm → pt 変換
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// pt → mm 変換
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}
