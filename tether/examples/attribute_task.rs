#[tether::task]
fn simple_computation(x: i32) -> i32 {
    std::thread::sleep(std::time::Duration::from_millis(100));
    x * x
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 Testing tether attribute macro");

    let result = simple_computation(7).await?;
    println!("7² = {}", result);

    let future = simple_computation(8);
    println!("future: {:?}", future);

    let result = future.await?;
    println!("8² = {}", result);

    Ok(())
}
