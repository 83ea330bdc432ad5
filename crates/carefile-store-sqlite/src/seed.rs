//! Reference data seed — the governed vocabularies the record fields draw
//! from. Idempotent via `INSERT OR IGNORE`; descriptions of already-seeded
//! codes are left alone so local edits survive restarts.

pub const SEED: &str = "
INSERT OR IGNORE INTO reference_data_domain
    (code, description, list_sequence, created_at, created_by)
VALUES
    ('FOOD_ALLERGY',      'Food allergy',                      1, '2024-01-01T00:00:00+00:00', 'SEED'),
    ('MEDICAL_DIET',      'Medical diet',                      2, '2024-01-01T00:00:00+00:00', 'SEED'),
    ('PERSONALISED_DIET', 'Personalised dietary requirements', 3, '2024-01-01T00:00:00+00:00', 'SEED'),
    ('SMOKER',            'Smoker or vaper',                   4, '2024-01-01T00:00:00+00:00', 'SEED');

INSERT OR IGNORE INTO reference_data_code
    (id, domain, code, description, list_sequence, created_at, created_by)
VALUES
    ('FOOD_ALLERGY_CELERY',      'FOOD_ALLERGY', 'CELERY',      'Celery',                          0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_CRUSTACEANS', 'FOOD_ALLERGY', 'CRUSTACEANS', 'Crustaceans',                     0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_EGG',         'FOOD_ALLERGY', 'EGG',         'Egg',                             0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_FISH',        'FOOD_ALLERGY', 'FISH',        'Fish',                            0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_GLUTEN',      'FOOD_ALLERGY', 'GLUTEN',      'Cereals containing gluten',       0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_MILK',        'FOOD_ALLERGY', 'MILK',        'Milk',                            0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_PEANUTS',     'FOOD_ALLERGY', 'PEANUTS',     'Peanuts',                         0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_SESAME',      'FOOD_ALLERGY', 'SESAME',      'Sesame',                          0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_SOYA',        'FOOD_ALLERGY', 'SOYA',        'Soya',                            0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('FOOD_ALLERGY_OTHER',       'FOOD_ALLERGY', 'OTHER',       'Other',                           99, '2024-01-01T00:00:00+00:00', 'SEED'),

    ('MEDICAL_DIET_COELIAC',          'MEDICAL_DIET', 'COELIAC',          'Coeliac (cannot eat gluten)',   0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('MEDICAL_DIET_DIABETIC',         'MEDICAL_DIET', 'DIABETIC',         'Diabetic',                      0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('MEDICAL_DIET_EATING_DISORDER',  'MEDICAL_DIET', 'EATING_DISORDER',  'Eating disorder',               0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('MEDICAL_DIET_FOOD_INTOLERANCE', 'MEDICAL_DIET', 'FOOD_INTOLERANCE', 'Food intolerance',              0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('MEDICAL_DIET_LOW_CHOLESTEROL',  'MEDICAL_DIET', 'LOW_CHOLESTEROL',  'Low cholesterol',               0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('MEDICAL_DIET_LOW_SALT',         'MEDICAL_DIET', 'LOW_SALT',         'Low salt',                      0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('MEDICAL_DIET_OTHER',            'MEDICAL_DIET', 'OTHER',            'Other',                         99, '2024-01-01T00:00:00+00:00', 'SEED'),

    ('PERSONALISED_DIET_HALAL',       'PERSONALISED_DIET', 'HALAL',       'Halal',                         0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('PERSONALISED_DIET_KOSHER',      'PERSONALISED_DIET', 'KOSHER',      'Kosher',                        0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('PERSONALISED_DIET_PESCATARIAN', 'PERSONALISED_DIET', 'PESCATARIAN', 'Pescatarian',                   0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('PERSONALISED_DIET_VEGAN',       'PERSONALISED_DIET', 'VEGAN',       'Vegan',                         0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('PERSONALISED_DIET_VEGETARIAN',  'PERSONALISED_DIET', 'VEGETARIAN',  'Vegetarian',                    0,  '2024-01-01T00:00:00+00:00', 'SEED'),
    ('PERSONALISED_DIET_OTHER',       'PERSONALISED_DIET', 'OTHER',       'Other',                         99, '2024-01-01T00:00:00+00:00', 'SEED'),

    ('SMOKER_YES',   'SMOKER', 'YES',   'Yes - they smoke',                        1, '2024-01-01T00:00:00+00:00', 'SEED'),
    ('SMOKER_VAPER', 'SMOKER', 'VAPER', 'Vaper or uses nicotine replacement',      2, '2024-01-01T00:00:00+00:00', 'SEED'),
    ('SMOKER_NO',    'SMOKER', 'NO',    'No - they do not smoke or vape',          3, '2024-01-01T00:00:00+00:00', 'SEED');
";
