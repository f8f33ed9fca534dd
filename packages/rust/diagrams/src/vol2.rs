//! Figures for the second volume (準1級).

use image::Rgb;

use crate::canvas::{
    BLACK, BLUE, Canvas, GRAY, GREEN, LAVENDER, LIGHT_BLUE, LIGHT_CORAL, LIGHT_GRAY, LIGHT_GREEN,
    LIGHT_YELLOW, ORANGE, PINK, PURPLE, RED, Shape, TextStyle, WHITE, YELLOW, hex, tint,
};

/// Title for a "wrong way" panel.
fn ng(c: &mut Canvas, text: &str) {
    c.title(&format!("NG  {text}"), TextStyle::new(11.0).color(RED).bold());
}

/// Title for a "right way" panel.
fn ok(c: &mut Canvas, text: &str) {
    c.title(&format!("OK  {text}"), TextStyle::new(11.0).color(GREEN).bold());
}

pub fn bep_flow(c: &mut Canvas) {
    c.title("BIM実行計画（BEP）の構成", TextStyle::new(16.0).bold());
    c.limits((0.0, 1.0), (0.1, 1.0));

    let items = [
        ("1. プロジェクト概要", hex(0xFFE6E6)),
        ("2. BIM目標・ユースケース", hex(0xFFD9B3)),
        ("3. 組織体制・責任分担", hex(0xFFFFCC)),
        ("4. 情報要求事項", hex(0xD9FFD9)),
        ("5. 成果物仕様", hex(0xCCE5FF)),
        ("6. プロセス・ワークフロー", hex(0xE6D9FF)),
        ("7. 技術インフラ", hex(0xFFD9E6)),
        ("8. 品質管理", hex(0xE6FFE6)),
    ];
    for (i, (item, color)) in items.iter().enumerate() {
        let y = 0.9 - i as f32 * 0.1;
        c.round_rect(0.15, y - 0.035, 0.6, 0.07, Shape::fill(tint(*color, 0.8)).stroke(BLACK, 2.0));
        c.text(0.45, y, item, TextStyle::new(12.0).bold());
        if i + 1 < items.len() {
            c.arrow((0.45, y - 0.035), (0.45, y - 0.065), GRAY, 2.0);
        }
    }

    let stages = [
        ("企画段階", 0.9, RED, PINK),
        ("設計段階", 0.5, BLUE, LIGHT_BLUE),
        ("施工段階", 0.2, GREEN, LIGHT_GREEN),
    ];
    for (label, y, color, fill) in stages {
        c.label(0.82, y, label, TextStyle::new(10.0).color(color).left(), tint(fill, 0.5));
    }
}

pub fn four_d_five_d_bim(c: &mut Canvas) {
    c.title("nD BIM - 多次元BIMの展開", TextStyle::new(16.0).bold());

    let axes = [
        ("4D\n時間軸\n(工程)", 0.5, 0.8, hex(0xFFD9D9), "施工シミュレーション"),
        ("5D\nコスト軸\n(原価)", 0.8, 0.5, hex(0xD9FFD9), "原価管理"),
        ("6D\n維持管理", 0.5, 0.2, hex(0xD9D9FF), "FM・設備管理"),
        ("7D\nサステナ\nビリティ", 0.2, 0.5, hex(0xFFFFD9), "環境性能"),
    ];

    for (_, x, y, _, _) in axes {
        c.line((0.5, 0.5), (x, y), tint(BLUE, 0.5), 2.0);
    }

    c.circle(0.5, 0.5, 0.12, Shape::fill(tint(ORANGE, 0.6)).stroke(BLACK, 3.0));
    c.text(0.5, 0.5, "3D\nBIMモデル", TextStyle::new(12.0).bold());

    let note = TextStyle::new(8.0).color(GRAY);
    for (label, x, y, color, desc) in axes {
        c.circle(x, y, 0.08, Shape::fill(tint(color, 0.7)).stroke(BLACK, 2.0));
        c.text(x, y, label, TextStyle::new(10.0).bold());
        if y > 0.5 {
            c.text(x, y + 0.14, desc, note);
        } else if y < 0.5 {
            c.text(x, y - 0.14, desc, note);
        } else if x > 0.5 {
            c.text(x + 0.1, y, desc, note.left());
        } else {
            c.text(x - 0.1, y, desc, note.right());
        }
    }

    c.text(0.5, 0.02, "3D空間モデルに時間・コスト・維持管理・環境の軸を追加", TextStyle::new(10.0).color(GRAY));
}

pub fn family_hierarchy_detail(c: &mut Canvas) {
    c.title("Revitファミリの階層構造", TextStyle::new(16.0).bold());

    c.round_rect(0.35, 0.85, 0.3, 0.08, Shape::fill(LIGHT_BLUE).stroke(BLACK, 3.0));
    c.text(0.5, 0.89, "プロジェクト", TextStyle::new(14.0).bold());

    let categories = [("壁", 0.15), ("ドア", 0.35), ("窓", 0.55), ("家具", 0.75)];
    for (name, x) in categories {
        c.line((0.5, 0.85), (x, 0.73), BLACK, 1.5);
        c.round_rect(x - 0.08, 0.67, 0.16, 0.06, Shape::fill(LIGHT_GREEN).stroke(BLUE, 2.0));
        c.text(x, 0.7, name, TextStyle::new(11.0).bold());
    }

    let types = [
        ("RC200", 0.08, 0.15),
        ("LGS100", 0.22, 0.15),
        ("片開き", 0.28, 0.35),
        ("両開き", 0.42, 0.35),
        ("引違い", 0.48, 0.55),
        ("FIX", 0.62, 0.55),
        ("デスク", 0.68, 0.75),
        ("チェア", 0.82, 0.75),
    ];
    for (_, x, parent) in types {
        c.line((parent, 0.67), (x, 0.54), GREEN, 1.0);
    }
    for (name, x, _) in types {
        c.rect(x - 0.05, 0.5, 0.1, 0.04, Shape::fill(LIGHT_YELLOW).stroke(GREEN, 1.5));
        c.text(x, 0.52, name, TextStyle::new(9.0));
    }

    c.text(0.5, 0.35, "▼ インスタンス（個別の要素）", TextStyle::new(12.0).color(PURPLE).bold());
    let instances = [
        ("壁1\nID:123456", 0.08),
        ("壁2\nID:123457", 0.22),
        ("ドア1\nID:234567", 0.35),
        ("窓1\nID:345678", 0.55),
        ("デスク1\nID:456789", 0.75),
    ];
    for (name, x) in instances {
        c.ellipse(x, 0.22, 0.12, 0.08, Shape::fill(LAVENDER).stroke(PURPLE, 1.5));
        c.text(x, 0.22, name, TextStyle::new(8.0));
    }

    c.text(0.1, 0.06, "■ 階層構造", TextStyle::new(10.0).bold().left());
    c.text(
        0.1,
        0.02,
        "  プロジェクト > カテゴリ > ファミリタイプ > インスタンス",
        TextStyle::new(9.0).left(),
    );
}

pub fn worksharing_concept(c: &mut Canvas) {
    c.title("ワークシェアリング - 複数人での同時作業", TextStyle::new(16.0).bold());

    c.text(0.5, 0.92, "■ ワークシェアリングの仕組み", TextStyle::new(14.0).bold());

    let users = [
        ("意匠設計者A", 0.15, LIGHT_GREEN),
        ("構造設計者B", 0.5, LIGHT_YELLOW),
        ("設備設計者C", 0.85, LIGHT_CORAL),
    ];
    let y = 0.38;
    for (_, x, _) in users {
        c.arrow((x - 0.02, y + 0.07), (0.49, 0.6), BLUE, 2.0);
        c.text((x + 0.5) / 2.0 - 0.05, (y + 0.6) / 2.0 + 0.02, "Sync", TextStyle::new(8.0).color(BLUE).right());
        c.dashed_line((0.51, 0.6), (x + 0.02, y + 0.08), GREEN, 1.5);
        c.arrow((x + 0.05, y + 0.12), (x + 0.02, y + 0.08), GREEN, 1.5);
        c.text((x + 0.5) / 2.0 + 0.05, (y + 0.6) / 2.0 - 0.02, "Reload", TextStyle::new(8.0).color(GREEN).left());
    }

    c.round_rect(0.38, 0.6, 0.24, 0.15, Shape::fill(LIGHT_BLUE).stroke(BLACK, 3.0));
    c.text(0.5, 0.69, "中央ファイル\n(Central File)", TextStyle::new(13.0).bold());
    c.text(0.5, 0.63, "サーバー上に配置", TextStyle::new(9.0).color(GRAY));

    for (name, x, color) in users {
        c.circle(x, y, 0.06, Shape::fill(tint(color, 0.7)).stroke(BLACK, 2.0));
        c.text(x, y, name, TextStyle::new(9.0).bold());
        c.rect(x - 0.08, y - 0.2, 0.16, 0.08, Shape::fill(WHITE).stroke(GRAY, 1.5).dashed());
        c.text(x, y - 0.16, "ローカル\nコピー", TextStyle::new(8.0));
    }

    c.label(
        0.5,
        0.06,
        "1. 各設計者がローカルコピーを編集\n2. 定期的に中央ファイルと同期（Sync）\n3. 他者の変更を取得（Reload Latest）",
        TextStyle::new(10.0),
        tint(YELLOW, 0.3),
    );
}

pub fn clash_detection(c: &mut Canvas) {
    c.suptitle("干渉チェック（Clash Detection）の例");

    let beam = Shape::fill(tint(GRAY, 0.5)).stroke(BLACK, 2.0);
    let pipe = Shape::fill(tint(BLUE, 0.6)).stroke(BLUE, 2.0);

    c.panel(0, 0, 2, 2);
    c.title("NG  干渉検出: 配管と梁", TextStyle::new(12.0).color(RED).bold());
    c.limits((0.0, 1.0), (0.2, 0.8));
    c.rect(0.2, 0.5, 0.6, 0.15, beam);
    c.circle(0.5, 0.575, 0.08, pipe);
    c.star(0.5, 0.575, 10.0, RED);
    c.text(0.5, 0.3, "問題: 配管が梁を貫通", TextStyle::new(10.0).color(RED));
    c.legend(&[("梁", tint(GRAY, 0.5)), ("配管", tint(BLUE, 0.6)), ("干渉！", RED)]);

    c.panel(1, 0, 2, 2);
    c.title("OK  解決策: 配管位置変更", TextStyle::new(12.0).color(GREEN).bold());
    c.limits((0.0, 1.0), (0.2, 0.8));
    c.rect(0.2, 0.5, 0.6, 0.15, beam);
    c.circle(0.5, 0.35, 0.08, pipe);
    c.text(0.5, 0.75, "配管を下方へ移動", TextStyle::new(10.0).color(GREEN));
    c.legend(&[("梁", tint(GRAY, 0.5)), ("配管（移動後）", tint(BLUE, 0.6))]);

    let wall = Shape::fill(tint(LIGHT_GRAY, 0.7)).stroke(BLACK, 2.0);
    let duct = Shape::fill(tint(YELLOW, 0.6)).stroke(ORANGE, 2.0);

    c.panel(0, 1, 2, 2);
    c.title("NG  干渉検出: ダクトと壁", TextStyle::new(12.0).color(RED).bold());
    c.limits((0.2, 0.8), (0.0, 0.9));
    c.rect(0.45, 0.2, 0.1, 0.6, wall);
    c.rect(0.3, 0.45, 0.4, 0.12, duct);
    c.rect(0.45, 0.45, 0.1, 0.12, Shape::fill(tint(RED, 0.5)));
    c.text(0.5, 0.1, "問題: ダクトが壁を貫通", TextStyle::new(10.0).color(RED));
    c.legend(&[("壁", tint(LIGHT_GRAY, 0.7)), ("ダクト", tint(YELLOW, 0.6)), ("干渉！", tint(RED, 0.5))]);

    c.panel(1, 1, 2, 2);
    c.title("OK  解決策: スリーブ設置", TextStyle::new(12.0).color(GREEN).bold());
    c.limits((0.2, 0.8), (0.0, 0.9));
    c.rect(0.45, 0.2, 0.1, 0.6, wall);
    c.rect(0.45, 0.45, 0.1, 0.12, Shape::fill(WHITE).stroke(BLUE, 2.0).dashed());
    c.rect(0.3, 0.45, 0.4, 0.12, duct);
    c.text(0.5, 0.1, "スリーブを設置して貫通部を確保", TextStyle::new(10.0).color(GREEN));
    c.legend(&[("壁", tint(LIGHT_GRAY, 0.7)), ("スリーブ", BLUE), ("ダクト", tint(YELLOW, 0.6))]);
}

pub fn ng_ok_level_mistake(c: &mut Canvas) {
    c.panel(0, 0, 2, 1);
    c.title("NG例: レベル設定ミス", TextStyle::new(12.0).color(RED).bold());
    c.limits((0.0, 1.0), (-0.1, 1.0));
    c.line((0.2, 0.0), (0.2, 0.6), BLACK, 2.0);
    c.polyline(&[(0.2, 0.6), (0.8, 0.6), (0.8, 0.9), (0.2, 0.9), (0.2, 0.6)], RED, 2.0);
    c.text(0.1, 0.6, "2FL", TextStyle::new(10.0).right());
    c.text(0.1, 0.0, "1FL", TextStyle::new(10.0).right());
    c.label(0.5, 0.75, "壁の上端を\n数値で指定\n(2700)", TextStyle::new(9.0), tint(YELLOW, 0.7));
    c.text(0.5, 0.3, "問題: 階高変更時に\n追随しない", TextStyle::new(10.0).color(RED).bold());

    c.panel(1, 0, 2, 1);
    c.title("OK例: 正しいレベル設定", TextStyle::new(12.0).color(GREEN).bold());
    c.limits((0.0, 1.0), (-0.1, 1.1));
    c.line((0.2, 0.0), (0.2, 0.6), BLACK, 2.0);
    c.polyline(&[(0.2, 0.6), (0.8, 0.6), (0.8, 1.0), (0.2, 1.0), (0.2, 0.6)], GREEN, 2.0);
    c.dashed_line((0.15, 1.0), (0.85, 1.0), BLUE, 1.5);
    c.text(0.1, 1.0, "3FL", TextStyle::new(10.0).color(BLUE).right());
    c.text(0.1, 0.6, "2FL", TextStyle::new(10.0).right());
    c.text(0.1, 0.0, "1FL", TextStyle::new(10.0).right());
    c.label(0.5, 0.8, "壁の上端を\n「3FL」で指定", TextStyle::new(9.0), tint(LIGHT_GREEN, 0.7));
    c.text(0.5, 0.3, "利点: 階高変更に\n自動追随", TextStyle::new(10.0).color(GREEN).bold());
}

/// Storey line with level labels and the height of each storey.
fn storeys(c: &mut Canvas, levels: &[(f32, &str)], color: Rgb<u8>, heights: &[(&str, f32)]) {
    c.line((0.2, levels[0].0), (0.2, levels[levels.len() - 1].0), color, 2.0);
    for (y, name) in levels {
        c.line((0.17, *y), (0.23, *y), BLACK, 1.5);
        c.text(0.1, *y, name, TextStyle::new(9.0).right());
    }
    for (text, y) in heights {
        c.text(0.3, *y, text, TextStyle::new(8.0).color(color).left());
    }
}

pub fn level_mistake_detail(c: &mut Canvas) {
    c.panel(0, 0, 2, 2);
    ng(c, "失敗例1: 日本語レベル名");
    c.label(0.5, 0.65, "レベル1\nレベル2\nレベル3", TextStyle::new(12.0), tint(PINK, 0.7));
    c.text(0.5, 0.2, "問題: 文字化けの可能性", TextStyle::new(9.0).color(RED));

    c.panel(1, 0, 2, 2);
    ok(c, "正解: 英数字レベル名");
    c.label(0.5, 0.65, "1FL\n2FL\n3FL", TextStyle::new(12.0), tint(LIGHT_GREEN, 0.7));
    c.text(0.5, 0.2, "推奨: 統一された命名", TextStyle::new(9.0).color(GREEN));

    let levels_ng = [(0.1, "GL"), (0.4, "1FL"), (0.75, "2FL"), (1.0, "RFL")];
    c.panel(0, 1, 2, 2);
    ng(c, "失敗例2: 階高不統一");
    c.limits((0.0, 1.0), (0.0, 1.1));
    storeys(c, &levels_ng, RED, &[("3.0m", 0.25), ("3.5m", 0.575), ("2.5m", 0.875)]);
    c.text(0.6, 0.05, "問題: 階高がバラバラ", TextStyle::new(9.0).color(RED));

    let levels_ok = [(0.1, "GL"), (0.4, "1FL"), (0.7, "2FL"), (1.0, "RFL")];
    c.panel(1, 1, 2, 2);
    ok(c, "正解: 階高統一");
    c.limits((0.0, 1.0), (0.0, 1.1));
    storeys(c, &levels_ok, GREEN, &[("3.0m", 0.25), ("3.0m", 0.55), ("3.0m", 0.85)]);
    c.text(0.6, 0.05, "推奨: 統一された階高", TextStyle::new(9.0).color(GREEN));
}

pub fn wall_mistake_patterns(c: &mut Canvas) {
    c.panel(0, 0, 2, 2);
    ng(c, "失敗: 数値で高さ指定");
    c.limits((0.0, 1.0), (0.0, 0.8));
    c.rect(0.3, 0.3, 0.4, 0.35, Shape::fill(tint(PINK, 0.5)).stroke(RED, 2.0));
    c.text(0.5, 0.17, "高さ: 2700mm（固定）", TextStyle::new(9.0).color(RED));
    c.text(0.5, 0.06, "→階高変更時に追随しない", TextStyle::new(8.0).color(GRAY));

    c.panel(1, 0, 2, 2);
    ok(c, "正解: レベルで高さ指定");
    c.limits((0.0, 1.0), (0.0, 0.8));
    c.rect(0.3, 0.3, 0.4, 0.4, Shape::fill(tint(LIGHT_GREEN, 0.5)).stroke(GREEN, 2.0));
    c.dashed_line((0.15, 0.7), (0.85, 0.7), BLUE, 1.5);
    c.text(0.88, 0.7, "2FL", TextStyle::new(9.0).color(BLUE).left());
    c.text(0.5, 0.17, "上端: 2FLレベル", TextStyle::new(9.0).color(GREEN));
    c.text(0.5, 0.06, "→自動追随", TextStyle::new(8.0).color(GRAY));

    c.panel(0, 1, 2, 2);
    ng(c, "失敗: グリッドからズレ");
    c.limits((0.3, 0.7), (0.0, 0.8));
    c.dashed_line((0.5, 0.2), (0.5, 0.7), BLUE, 1.5);
    c.line((0.52, 0.2), (0.52, 0.7), RED, 3.0);
    c.text(0.5, 0.12, "Grid", TextStyle::new(9.0).color(BLUE));
    c.text(0.52, 0.05, "+5mm", TextStyle::new(9.0).color(RED));
    c.legend(&[("Grid", BLUE), ("Wall", RED)]);

    c.panel(1, 1, 2, 2);
    ok(c, "正解: グリッドに整列");
    c.limits((0.3, 0.7), (0.0, 0.8));
    c.line((0.5, 0.2), (0.5, 0.7), GREEN, 3.0);
    c.dashed_line((0.5, 0.2), (0.5, 0.7), BLUE, 1.5);
    c.text(0.5, 0.12, "Grid=Wall", TextStyle::new(9.0).color(GREEN));
    c.text(0.5, 0.05, "0mm", TextStyle::new(9.0).color(GREEN));
    c.legend(&[("Grid", BLUE), ("Wall", GREEN)]);
}

pub fn floor_mistake_examples(c: &mut Canvas) {
    c.panel(0, 0, 2, 2);
    ng(c, "失敗: 間違ったレベル");
    c.limits((0.0, 1.0), (0.1, 0.7));
    c.line((0.2, 0.3), (0.8, 0.3), BLACK, 2.0);
    c.dashed_line((0.2, 0.6), (0.8, 0.6), BLUE, 2.0);
    c.rect(0.25, 0.28, 0.5, 0.04, Shape::fill(tint(RED, 0.5)));
    c.text(0.5, 0.15, "2階の床を1FLに作成", TextStyle::new(9.0).color(RED));
    c.legend(&[("1FL", BLACK), ("2FL", BLUE)]);

    c.panel(1, 0, 2, 2);
    ok(c, "正解: 正しいレベル");
    c.limits((0.0, 1.0), (0.1, 0.7));
    c.line((0.2, 0.3), (0.8, 0.3), BLACK, 2.0);
    c.line((0.2, 0.6), (0.8, 0.6), BLUE, 2.0);
    c.rect(0.25, 0.58, 0.5, 0.04, Shape::fill(tint(GREEN, 0.5)));
    c.text(0.5, 0.15, "2階の床を2FLに作成", TextStyle::new(9.0).color(GREEN));
    c.legend(&[("1FL", BLACK), ("2FL", BLUE)]);

    c.panel(0, 1, 2, 2);
    ng(c, "失敗: 境界線が閉じていない");
    c.limits((0.2, 0.8), (0.1, 0.8));
    c.polyline(&[(0.3, 0.3), (0.3, 0.7), (0.7, 0.7), (0.7, 0.32)], RED, 2.0);
    c.polyline(&[(0.3, 0.3), (0.68, 0.3)], RED, 2.0);
    c.circle(0.7, 0.3, 0.02, Shape::fill(RED));
    c.text(0.73, 0.25, "隙間!", TextStyle::new(9.0).color(RED).bold().left());
    c.text(0.5, 0.15, "エラー: 境界線が閉じていません", TextStyle::new(9.0).color(RED));

    c.panel(1, 1, 2, 2);
    ok(c, "正解: 境界線が閉じている");
    c.limits((0.2, 0.8), (0.1, 0.8));
    c.rect(0.3, 0.3, 0.4, 0.4, Shape::fill(tint(LIGHT_GREEN, 0.3)).stroke(GREEN, 2.0));
    c.text(0.5, 0.15, "床が正常に作成される", TextStyle::new(9.0).color(GREEN));
}
