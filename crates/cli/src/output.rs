use crate::error::CliError;
use model::{
    fetch::{keys::FetchByKeysResults, list::AsyncIteratorResult, offset::FetchByOffsetResults},
    records::item::Item,
};
use serde_json::json;

fn item_json(item: &Item) -> serde_json::Value {
    json!({
        "key": item.key().to_json(),
        "data": item.data.to_json(),
    })
}

pub fn print_page(index: usize, step: &AsyncIteratorResult) -> Result<(), CliError> {
    let page = json!({
        "page": index,
        "done": step.done,
        "items": step
            .value
            .keys()
            .zip(step.value.data())
            .map(|(key, data)| json!({ "key": key.to_json(), "data": data.to_json() }))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

pub fn print_keys(found: &FetchByKeysResults) -> Result<(), CliError> {
    let mut items: Vec<&Item> = found.results.values().collect();
    items.sort_by(|a, b| a.key().to_string().cmp(&b.key().to_string()));

    let out = json!({
        "requested": found.fetch_parameters.keys.len(),
        "found": items.into_iter().map(item_json).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub fn print_window(window: &FetchByOffsetResults) -> Result<(), CliError> {
    let out = json!({
        "offset": window.fetch_parameters.offset,
        "size": window.fetch_parameters.size,
        "done": window.done,
        "items": window.results.iter().map(item_json).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
