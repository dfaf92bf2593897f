use anyhow::Result;
use ndarray::Array2;
use ngramlab_kernels::attention::{multi_layer_self_attention, scaled_self_attention_weights};
use ngramlab_kernels::utils::row_norms;
use ngramlab_llm::{GenerationOptions, LanguageModel, ModelConfig, StopReason};

const CORPUS: [&str; 10] = [
    "The cat sits on the mat every morning",
    "The dog runs in the park every afternoon",
    "A bird flies over the house at dawn",
    "The sun rises in the east and sets in the west",
    "Water flows down the river to the sea",
    "The moon shines bright in the night sky",
    "Children play in the garden after school",
    "Books contain knowledge from many generations",
    "Music brings joy to people around the world",
    "Trees grow tall in the forest over time",
];

fn seeded(seed: u64) -> fastrand::Rng {
    fastrand::Rng::with_seed(seed)
}

#[test]
fn chain_reaches_end_of_training_text() -> Result<()> {
    let config = ModelConfig::tiny().with_context_size(2);
    let mut model = LanguageModel::train(&["a b c d"], config)?;
    let options = GenerationOptions {
        max_new_tokens: 2,
        temperature: 0.7,
        top_p: Some(0.9),
    };

    for seed in 0..5 {
        let generation = model.generate("a b", &options, &mut seeded(seed))?;
        assert_eq!(generation.text, "a b c d");
    }

    let longer = GenerationOptions {
        max_new_tokens: 5,
        ..options
    };
    let generation = model.generate("a b", &longer, &mut seeded(0))?;
    assert_eq!(generation.text, "a b c d");
    assert_eq!(generation.stop_reason, StopReason::ContextMiss);
    Ok(())
}

#[test]
fn default_pipeline_continues_prompts() -> Result<()> {
    let config = ModelConfig {
        seed: Some(17),
        ..ModelConfig::default()
    };
    let mut model = LanguageModel::train(&CORPUS, config)?;
    assert_eq!(model.context_size(), 3);
    assert_eq!(model.embeddings().dimension(), 64);
    for word in ["the", "cat", "dog", "sun"] {
        assert!(model.vocabulary().encode(word).is_some());
    }

    let options = GenerationOptions::from_config(model.config());
    let mut rng = seeded(99);

    let cat = model.generate("the cat sits", &options, &mut rng)?;
    assert_eq!(cat.text, "the cat sits on the mat every morning");

    let dog = model.generate("the dog runs", &options, &mut rng)?;
    assert!(dog.text.starts_with("the dog runs in the park"));
    assert_ne!(cat.text, dog.text);

    let short = GenerationOptions {
        max_new_tokens: 2,
        ..options
    };
    let sun = model.generate("the sun rises", &short, &mut rng)?;
    assert_eq!(sun.text.split(' ').count(), 5);
    Ok(())
}

#[test]
fn same_seed_same_output() -> Result<()> {
    let texts = ["i like cats", "i like dogs", "i like birds", "you like cats"];
    let config = ModelConfig::tiny().with_context_size(1);
    let mut model = LanguageModel::train(&texts, config)?;
    let options = GenerationOptions {
        max_new_tokens: 2,
        temperature: 1.5,
        top_p: None,
    };

    let first: Vec<String> = (0..10)
        .map(|seed| model.generate("i", &options, &mut seeded(seed)).map(|g| g.text))
        .collect::<Result<_>>()?;
    let second: Vec<String> = (0..10)
        .map(|seed| model.generate("i", &options, &mut seeded(seed)).map(|g| g.text))
        .collect::<Result<_>>()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn unknown_prompt_word_propagates() -> Result<()> {
    let mut model = LanguageModel::train(&CORPUS, ModelConfig::default())?;
    let options = GenerationOptions::from_config(model.config());
    let err = model
        .generate("the quantum cat", &options, &mut seeded(1))
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown word: quantum");
    Ok(())
}

#[test]
fn attention_over_model_embeddings_is_well_formed() -> Result<()> {
    let config = ModelConfig {
        seed: Some(17),
        ..ModelConfig::default()
    };
    let model = LanguageModel::train(&CORPUS, config)?;
    let vocab = model.vocabulary();
    let tokens: Vec<usize> = ["the", "cat", "sits"]
        .iter()
        .map(|w| vocab.encode(w).expect("trained word"))
        .collect();

    let mut store = model.embeddings().clone();
    let embeddings: Array2<f32> = store.embed_sequence(&tokens);
    let weights = scaled_self_attention_weights(embeddings.view());
    for row in weights.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-5);
    }

    let identity = multi_layer_self_attention(embeddings.view(), 0)?;
    assert_eq!(identity, embeddings);

    let one = row_norms(multi_layer_self_attention(embeddings.view(), 1)?.view());
    let base = row_norms(embeddings.view());
    assert_eq!(one.len(), base.len());
    for (after, before) in one.iter().zip(base.iter()) {
        assert!(after >= before, "residual layer shrank a row: {after} < {before}");
    }
    Ok(())
}
