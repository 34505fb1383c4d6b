//! End-to-end rewrites through the library API.
//!
//! Each test parses a complete compilation unit, runs the engine, commits,
//! and asserts on the rendered output text.
#![allow(clippy::unwrap_used)]

use debind::diagnostics::{DiagnosticSink, Severity};
use debind::engine::Engine;
use debind::listener::{FixedListener, ListenerClass};
use debind::tree::JavaTree;

fn fixed_lookup() -> FixedListener {
    FixedListener(Some(ListenerClass::from_qualified(
        "com.example.ui.DebouncingOnClickListener",
    )))
}

fn rewrite(source: &str) -> (String, DiagnosticSink) {
    let lookup = fixed_lookup();
    let engine = Engine::new(&lookup);
    let mut sink = DiagnosticSink::new();
    let mut tree = JavaTree::parse(source).unwrap();
    engine.rewrite_unit(&mut tree, "unit", &mut sink).unwrap();
    (tree.commit().unwrap().source, sink)
}

const ACTIVITY: &str = r"package com.example;

import android.os.Bundle;
import butterknife.BindView;
import butterknife.ButterKnife;
import butterknife.OnClick;
import butterknife.Unbinder;

public class MainActivity extends Activity {
    @BindView(R2.id.tv_title)
    TextView tvTitle;

    @BindView(R.id.btn_ok)
    Button btnOk;

    private Unbinder unbinder;

    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
        setContentView(R.layout.activity_main);
        unbinder = ButterKnife.bind(this);
    }

    @Override
    protected void onDestroy() {
        super.onDestroy();
        if (unbinder != null) {
            unbinder.unbind();
        }
    }

    @OnClick(R.id.btn_ok)
    void onOkClicked(View v) {
        finish();
    }
}
";

#[test]
fn activity_rewrite_produces_plain_lookups() {
    let (out, _) = rewrite(ACTIVITY);

    assert!(out.contains("private void __bindViews() {"));
    assert!(out.contains("tvTitle = findViewById(R.id.tv_title);"));
    assert!(out.contains("btnOk = findViewById(R.id.btn_ok);"));
    assert!(out.contains("__bindViews();"));
    assert!(out.contains("private void __bindClicks() {"));
    assert!(out.contains(
        "findViewById(R.id.btn_ok).setOnClickListener((DebouncingOnClickListener) _v -> onOkClicked(_v));"
    ));
    assert!(out.contains("__bindClicks();"));
}

#[test]
fn activity_rewrite_removes_all_framework_residue() {
    let (out, _) = rewrite(ACTIVITY);

    assert!(!out.to_lowercase().contains("butterknife"));
    assert!(!out.contains("@BindView"));
    assert!(!out.contains("@OnClick"));
    assert!(!out.contains("Unbinder"));
    assert!(!out.contains("unbinder"));
    // The non-framework statements of the touched methods survive.
    assert!(out.contains("super.onCreate(savedInstanceState);"));
    assert!(out.contains("setContentView(R.layout.activity_main);"));
    assert!(out.contains("super.onDestroy();"));
}

#[test]
fn view_call_lands_directly_after_the_anchor() {
    let (out, _) = rewrite(ACTIVITY);

    let anchor = out.find("setContentView(R.layout.activity_main);").unwrap();
    let views = out.find("__bindViews();").unwrap();
    let clicks = out.find("__bindClicks();").unwrap();
    assert!(anchor < views);
    assert!(views < clicks);
}

#[test]
fn replacement_listener_import_is_added() {
    let (out, _) = rewrite(ACTIVITY);
    assert!(out.contains("import com.example.ui.DebouncingOnClickListener;"));
}

#[test]
fn rewrite_is_idempotent() {
    let (first, _) = rewrite(ACTIVITY);

    let lookup = fixed_lookup();
    let engine = Engine::new(&lookup);
    let mut sink = DiagnosticSink::new();
    let mut tree = JavaTree::parse(&first).unwrap();
    let processed = engine.rewrite_unit(&mut tree, "unit", &mut sink).unwrap();

    assert!(!processed);
    let commit = tree.commit().unwrap();
    assert!(!commit.changed);
    assert_eq!(commit.source, first);
}

#[test]
fn nested_type_gets_its_own_anchor_and_qualifier() {
    let src = r"package com.example;

import butterknife.BindView;
import butterknife.ButterKnife;

public class ListAdapter {
    @BindView(R.id.list)
    RecyclerView list;

    public ListAdapter(View root) {
        this.root = root;
        ButterKnife.bind(this, root);
    }

    static class Holder {
        @BindView(R.id.row_title)
        TextView title;

        Holder(View itemView) {
            this.itemView = itemView;
        }
    }
}
";
    let (out, _) = rewrite(src);

    // Outer type anchors on its bind call; the second argument names the view.
    assert!(out.contains("list = root.findViewById(R.id.list);"));
    assert!(out.contains("__bindViews(root);"));
    // The nested type resolves independently from its own constructor.
    assert!(out.contains("private void __bindViews(View itemView) {"));
    assert!(out.contains("title = itemView.findViewById(R.id.row_title);"));
    assert!(out.contains("__bindViews(itemView);"));
    assert!(!out.contains("ButterKnife"));
}

#[test]
fn missing_anchor_reports_error_and_keeps_annotations() {
    let src = r"package com.example;

import butterknife.BindView;

public class Holder {
    @BindView(R.id.title)
    TextView title;
}
";
    let (out, sink) = rewrite(src);

    assert!(sink
        .events()
        .iter()
        .any(|d| d.severity == Severity::Error
            && d.message.contains("no suitable insertion point")));
    assert!(out.contains("@BindView(R.id.title)"));
    assert!(!out.contains("__bindViews"));
    // Import cleanup still runs.
    assert!(!out.contains("import butterknife.BindView;"));
}

#[test]
fn stray_bind_calls_outside_the_anchor_are_removed() {
    let src = r"package com.example;

import butterknife.BindView;
import butterknife.ButterKnife;

public class RefreshActivity extends Activity {
    @BindView(R.id.list)
    RecyclerView list;

    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
        ButterKnife.bind(this);
    }

    @Override
    protected void onResume() {
        super.onResume();
        ButterKnife.bind(this);
    }
}
";
    let (out, _) = rewrite(src);

    assert!(!out.contains("ButterKnife.bind("));
    assert!(out.contains("super.onResume();"));
}

#[test]
fn bind_call_inside_a_guard_block_does_not_take_the_block_with_it() {
    let src = r"package com.example;

import butterknife.BindView;
import butterknife.ButterKnife;

public class SplashActivity extends Activity {
    @BindView(R.id.logo)
    ImageView logo;

    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
        if (firstRun) {
            ButterKnife.bind(this);
            initData();
        }
    }
}
";
    let (out, _) = rewrite(src);

    // The guarded block is not a bind statement; its unrelated statements
    // survive intact.
    assert!(out.contains("if (firstRun) {"));
    assert!(out.contains("initData();"));
    // The cascade falls through to the super.onCreate probe, so the view
    // wiring lands between it and the guard block.
    let anchor = out.find("super.onCreate(savedInstanceState);").unwrap();
    let views = out.find("__bindViews();").unwrap();
    let guard = out.find("if (firstRun)").unwrap();
    assert!(anchor < views);
    assert!(views < guard);
    assert!(out.contains("logo = findViewById(R.id.logo);"));
}

#[test]
fn framework_debounce_import_is_swapped() {
    let src = r"package com.example;

import butterknife.internal.DebouncingOnClickListener;
import butterknife.OnClick;

public class FabActivity extends Activity {
    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
    }

    @OnClick(R.id.fab)
    void onFab() {
        refresh();
    }
}
";
    let (out, _) = rewrite(src);

    assert!(out.contains("import com.example.ui.DebouncingOnClickListener;"));
    assert!(!out.contains("butterknife.internal"));
    assert!(out.contains(
        "findViewById(R.id.fab).setOnClickListener((DebouncingOnClickListener) _v -> onFab());"
    ));
}

#[test]
fn missing_listener_skips_click_synthesis_only() {
    let src = r"package com.example;

import butterknife.BindView;
import butterknife.OnClick;

public class MixedActivity extends Activity {
    @BindView(R.id.title)
    TextView title;

    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
    }

    @OnClick(R.id.title)
    void onTitle() {
        refresh();
    }
}
";
    let lookup = FixedListener(None);
    let engine = Engine::new(&lookup);
    let mut sink = DiagnosticSink::new();
    let mut tree = JavaTree::parse(src).unwrap();
    engine.rewrite_unit(&mut tree, "unit", &mut sink).unwrap();
    let out = tree.commit().unwrap().source;

    assert!(out.contains("title = findViewById(R.id.title);"));
    assert!(!out.contains("__bindClicks"));
    assert!(out.contains("@OnClick(R.id.title)"));
    assert_eq!(sink.count(Severity::Error), 1);
}
