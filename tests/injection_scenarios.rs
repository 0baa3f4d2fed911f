use std::fs;
use std::path::{Path, PathBuf};

use gadgeter::inject::InjectionAction;
use gadgeter::smali::{Payload, SlotCounting};
use gadgeter::{InjectError, Injector};
use tempfile::TempDir;

const LOAD_CALL: &str =
    "    invoke-static {v0}, Ljava/lang/System;->loadLibrary(Ljava/lang/String;)V";

fn injector() -> Injector {
    Injector::new(Payload::new("frida-gadget"), SlotCounting::Observed)
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn attach_base_context_gets_a_scratch_register() {
    let temp = TempDir::new().unwrap();
    let path = write(
        temp.path(),
        "App.smali",
        "\
.class public Lcom/example/App;
.super Landroid/app/Application;
.source \"App.java\"

.method protected attachBaseContext(Landroid/content/Context;)V
    .registers 2

    .line 14
    invoke-super {p0, p1}, Landroid/app/Application;->attachBaseContext(Landroid/content/Context;)V

    return-void
.end method
",
    );

    let outcome = injector().inject_file(&path, 1).unwrap();
    assert!(matches!(outcome.action, InjectionAction::Spliced { .. }));

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[5], "    .registers 3");
    let first_insn = lines
        .iter()
        .position(|l| l.contains("invoke-super"))
        .unwrap();
    assert_eq!(lines[first_insn - 2], "    const-string v0, \"frida-gadget\"");
    assert_eq!(lines[first_insn - 1], LOAD_CALL);
    assert_eq!(lines[first_insn - 3], "");
    assert!(text.ends_with(".end method\n"));
}

#[test]
fn class_without_clinit_gets_one_after_super() {
    let temp = TempDir::new().unwrap();
    let path = write(
        temp.path(),
        "Holder.smali",
        "\
.class public final Lcom/example/Holder;

.super Ljava/lang/Object;

# direct methods
.method public constructor <init>()V
    .registers 1
    invoke-direct {p0}, Ljava/lang/Object;-><init>()V
    return-void
.end method
",
    );

    let outcome = injector().inject_file(&path, 2).unwrap();
    assert_eq!(outcome.action, InjectionAction::Synthesized { insert_at: 3 });

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[3], "");
    assert_eq!(lines[4], ".method static constructor <clinit>()V");
    assert_eq!(lines[5], "    .registers 1");
    assert_eq!(lines[6], "    const-string v0, \"frida-gadget\"");
    assert_eq!(lines[7], LOAD_CALL);
    assert_eq!(lines[9], "    return-void");
    assert_eq!(lines[10], ".end method");
}

#[test]
fn class_without_any_hook_is_never_rewritten() {
    let temp = TempDir::new().unwrap();
    let original = "\
.class public Lcom/example/Util;
.super Ljava/lang/Object;

.method public static helper()V
    .registers 0
    return-void
.end method
";
    let path = write(temp.path(), "Util.smali", original);
    let before = fs::metadata(&path).unwrap().modified().unwrap();

    for level in [1, 3] {
        let err = injector().inject_file(&path, level).unwrap_err();
        assert!(matches!(err, InjectError::TargetNotFound { .. }));
        assert!(err.is_recoverable());
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[test]
fn invalid_level_is_rejected_before_reading() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("Missing.smali");

    let err = injector().inject_file(&missing, 0).unwrap_err();
    assert!(matches!(err, InjectError::InvalidFallbackLevel(0)));

    let err = injector().inject_file(&missing, 1).unwrap_err();
    assert!(matches!(err, InjectError::MissingBackingUnit(_)));
}

#[test]
fn existing_clinit_is_not_duplicated() {
    let temp = TempDir::new().unwrap();
    let path = write(
        temp.path(),
        "Config.smali",
        "\
.class public Lcom/example/Config;
.super Ljava/lang/Object;

.field public static final DEBUG:Z

.method static constructor <clinit>()V
    .registers 1
    const/4 v0, 0x0
    sput-boolean v0, Lcom/example/Config;->DEBUG:Z
    return-void
.end method
",
    );

    let outcome = injector().inject_file(&path, 2).unwrap();
    assert_eq!(
        outcome.action,
        InjectionAction::Spliced {
            method_line: 5,
            insert_at: 7,
            registers: None,
        }
    );

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("<clinit>").count(), 1);
    assert_eq!(text.matches("loadLibrary").count(), 1);
}
