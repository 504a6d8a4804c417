use anyhow::Result;
use cmd::commands::{
    cat_command, copy_command, exists_command, handlers_command, rm_command, which_command,
};
use cmd::common::CmdContext;

fn output_of<F>(f: F) -> Result<String>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut out = Vec::new();
    f(&mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_copy_csv_to_yaml_and_cat() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let csv = dir.path().join("in.csv");
    std::fs::write(&csv, "name,size\nalpha,1\nbeta,2\n")?;
    let csv = csv.display().to_string();
    let ctx = CmdContext::default();

    let table = output_of(|out| cat_command(&ctx, &csv, None, out))?;
    assert!(table.contains("alpha"));
    assert!(table.contains("| name"));

    let json = dir.path().join("out.json").display().to_string();
    let txt = dir.path().join("copy.txt").display().to_string();
    copy_command(&ctx, &csv, &txt, Some("text"), None, false)?;
    assert_eq!(std::fs::read_to_string(&txt)?, "name,size\nalpha,1\nbeta,2\n");

    std::fs::write(&json, r#"{"a": [1, 2]}"#)?;
    let yaml = dir.path().join("out.yaml").display().to_string();
    copy_command(&ctx, &json, &yaml, None, None, false)?;
    let shown = output_of(|out| cat_command(&ctx, &yaml, None, out))?;
    assert!(shown.contains("\"a\""));

    assert!(copy_command(&ctx, &json, &yaml, None, None, false).is_err());
    copy_command(&ctx, &json, &yaml, None, None, true)?;
    Ok(())
}

#[test]
fn test_options_reach_handlers() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("data.json");
    std::fs::write(&src, r#"{"k": 1}"#)?;
    let dest = dir.path().join("pretty.json");

    let ctx = CmdContext::new(None, vec!["pretty=true".to_string()]);
    copy_command(
        &ctx,
        &src.display().to_string(),
        &dest.display().to_string(),
        None,
        None,
        false,
    )?;
    assert!(std::fs::read_to_string(&dest)?.contains("\n  \"k\": 1"));
    Ok(())
}

#[test]
fn test_which_exists_rm() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hi")?;
    let locator = path.display().to_string();
    let ctx = CmdContext::default();

    let which = output_of(|out| which_command(&ctx, &locator, None, out))?;
    assert!(which.starts_with("file.text\tlocal"));

    let mut out = Vec::new();
    assert!(exists_command(&ctx, &locator, None, &mut out)?);
    rm_command(&ctx, &locator, None)?;
    assert!(!exists_command(&ctx, &locator, None, &mut out)?);
    assert_eq!(String::from_utf8(out)?, "true\nfalse\n");
    Ok(())
}

#[test]
fn test_handlers_listing() -> Result<()> {
    let listing = output_of(|out| handlers_command(&CmdContext::default(), out))?;
    for name in ["df.csv", "df.csv.gz", "df.parquet", "json", "pjson", "gluedb", "python", "url"] {
        assert!(listing.contains(name), "missing {name} in {listing}");
    }
    assert!(listing.contains("read-only"));
    assert!(listing.contains("df.parquet   binary"));
    assert!(listing.contains("json         text"));
    assert!(listing.contains("python       object"));
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("hello.txt"), "from the package root")?;
    let config = dir.path().join("swark.yaml");
    std::fs::write(
        &config,
        format!("package_root: {}\n", dir.path().display()),
    )?;

    let ctx = CmdContext::new(Some(config), Vec::new());
    let text = output_of(|out| cat_command(&ctx, "swark:hello.txt", None, out))?;
    assert_eq!(text, "from the package root");
    Ok(())
}
