//! テキスト計測・整形
//!
//! PDF組み込みフォント（Helvetica, WinAnsi）向け。
//! 幅は `TextMeasure` 経由で測る。

pub const ELLIPSIS: &str = "...";

/// 文字幅の計測（フォントデータは描画側が持つ）
pub trait TextMeasure {
    /// テキスト幅（pt）
    fn width_pt(&self, text: &str, font_size_pt: f32) -> f32;
}

/// 組み込みフォントで描けない文字を置換
///
/// トルコ語の文字はASCIIへ音訳、それ以外のLatin-1外の文字は `?`。
pub fn to_win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ş' => 's',
            'Ş' => 'S',
            'ğ' => 'g',
            'Ğ' => 'G',
            'ı' => 'i',
            'İ' => 'I',
            '€' | '–' | '—' | '‘' | '’' | '“' | '”' | '•' => c,
            '\t' | '\n' | '\r' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}

/// 幅に収まるよう末尾を "..." で切り詰める
pub fn fit_to_width<M: TextMeasure + ?Sized>(
    text: &str,
    max_width_pt: f32,
    font_size_pt: f32,
    measure: &M,
) -> String {
    if measure.width_pt(text, font_size_pt) <= max_width_pt {
        return text.to_string();
    }

    let budget = max_width_pt - measure.width_pt(ELLIPSIS, font_size_pt);
    let mut fitted = String::new();
    let mut width = 0.0;
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let w = measure.width_pt(c.encode_utf8(&mut buf), font_size_pt);
        if width + w > budget {
            break;
        }
        width += w;
        fitted.push(c);
    }
    format!("{}{}", fitted.trim_end(), ELLIPSIS)
}

/// 単語単位で折り返す。最終行は収まらなければ切り詰める。
pub fn wrap_lines<M: TextMeasure + ?Sized>(
    text: &str,
    max_width_pt: f32,
    font_size_pt: f32,
    max_lines: usize,
    measure: &M,
) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut consumed = 0;

    for word in &words {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if measure.width_pt(&candidate, font_size_pt) <= max_width_pt || current.is_empty() {
            current = candidate;
            consumed += 1;
            continue;
        }

        lines.push(std::mem::take(&mut current));
        if lines.len() == max_lines {
            break;
        }
        current = word.to_string();
        consumed += 1;
    }

    if lines.len() < max_lines && !current.is_empty() {
        lines.push(current);
    }

    // 残りの単語は最終行にまとめて切り詰め
    let rest = &words[consumed.min(words.len())..];
    if let Some(last) = lines.last_mut() {
        if !rest.is_empty() {
            last.push(' ');
            last.push_str(&rest.join(" "));
        }
        *last = fit_to_width(last, max_width_pt, font_size_pt, measure);
    }

    // 1語が長すぎる行も切り詰め
    lines
        .into_iter()
        .map(|line| fit_to_width(&line, max_width_pt, font_size_pt, measure))
        .collect()
}
